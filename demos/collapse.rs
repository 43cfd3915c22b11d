use userkv_iter::{
    BytewiseComparator, IteratorOptions, Kind, StringAppendMerge, UserIterator, VecIterator,
};

fn main() {
    println!("UserIterator collapse demo");

    // Newest-first per key, as an internal iterator would present it.
    let records = vec![
        (b"a".to_vec(), Kind::Set, b"1".to_vec()),
        (b"b".to_vec(), Kind::Delete, b"".to_vec()),
        (b"b".to_vec(), Kind::Set, b"2".to_vec()),
        (b"c".to_vec(), Kind::Merge, b"C".to_vec()),
        (b"c".to_vec(), Kind::Merge, b"B".to_vec()),
        (b"c".to_vec(), Kind::Set, b"A".to_vec()),
    ];
    let inner = VecIterator::from_kinds(records);

    let opts = IteratorOptions {
        lower_bound: None,
        upper_bound: None,
        comparator: BytewiseComparator,
        merge_operator: StringAppendMerge::default(),
    };
    let mut iter = UserIterator::new(inner, opts, None);

    iter.first();
    while iter.valid() {
        let key = iter.key().unwrap();
        let value = iter.value().unwrap();
        println!(
            "{} = {}",
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(value)
        );
        iter.next();
    }

    if let Some(err) = iter.error() {
        eprintln!("iterator error: {err}");
    }

    iter.close().expect("close should not fail here");
}
