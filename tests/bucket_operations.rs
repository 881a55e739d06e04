//! Integration tests for path and key actors over a real database file.

#[cfg(test)]
mod tests {
    use redb_bucketeer::buckets::{I64Key, JsonKey, TextKey, U64Key};
    use redb_bucketeer::{EncodingError, Error, KeyBytes, Path, Store};
    use serde::{Deserialize, Serialize};
    use std::net::Ipv4Addr;
    use tempfile::NamedTempFile;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        age: u32,
    }

    fn temp_store() -> (NamedTempFile, Store) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = Store::create(temp_file.path()).unwrap();
        (temp_file, store)
    }

    #[test]
    fn test_byte_values() {
        let (_file, store) = temp_store();
        let bucket = store.root("test");
        bucket.ensure_path_buckets().unwrap();

        bucket.for_byte_key(b"k1".to_vec()).put_bytes(b"v1").unwrap();

        let value = bucket.for_byte_key(b"k1".to_vec()).get_bytes().unwrap();
        assert_eq!(value, Some(b"v1".to_vec()));
    }

    #[test]
    fn test_string_values() {
        let (_file, store) = temp_store();
        let bucket = store.root("test");
        bucket.ensure_path_buckets().unwrap();
        let key = bucket.for_string_key("k1");

        assert_eq!(key.get_string().unwrap(), None);

        key.put_string("hello").unwrap();
        assert_eq!(key.get_string().unwrap().as_deref(), Some("hello"));

        bucket.for_string_key("raw").put_bytes(&[0xFF, 0xFE]).unwrap();
        assert!(matches!(
            bucket.for_string_key("raw").get_string(),
            Err(Error::Encoding(EncodingError::InvalidUtf8))
        ));
    }

    #[test]
    fn test_integer_values() {
        let (_file, store) = temp_store();
        let bucket = store.root("counters");
        bucket.ensure_path_buckets().unwrap();

        let fixed = bucket.for_string_key("fixed");
        fixed.put_i64(-7).unwrap();
        assert_eq!(fixed.get_i64().unwrap(), Some(-7));
        assert_eq!(fixed.get_bytes().unwrap().unwrap().len(), 8);

        let var = bucket.for_string_key("var");
        var.put_varint(-300).unwrap();
        assert_eq!(var.get_varint().unwrap(), Some(-300));
        assert_eq!(var.get_bytes().unwrap().unwrap().len(), 2);

        let uvar = bucket.for_string_key("uvar");
        uvar.put_uvarint(u64::MAX).unwrap();
        assert_eq!(uvar.get_uvarint().unwrap(), Some(u64::MAX));

        // a varint is not an 8-byte value
        assert!(matches!(
            var.get_u64(),
            Err(Error::Encoding(EncodingError::InvalidLength {
                expected: 8,
                actual: 2
            }))
        ));
    }

    #[test]
    fn test_empty_value_is_not_a_varint() {
        let (_file, store) = temp_store();
        let bucket = store.root("counters");
        bucket.ensure_path_buckets().unwrap();

        let empty = bucket.for_string_key("empty");
        empty.put_bytes(&[]).unwrap();
        assert_eq!(empty.get_bytes().unwrap(), Some(Vec::new()));

        assert!(matches!(
            empty.get_varint(),
            Err(Error::Encoding(EncodingError::InvalidVarint(_)))
        ));
        assert!(matches!(
            empty.get_uvarint(),
            Err(Error::Encoding(EncodingError::InvalidVarint(_)))
        ));
    }

    #[test]
    fn test_key_exists_and_delete() {
        let (_file, store) = temp_store();
        let bucket = store.root("test");
        bucket.ensure_path_buckets().unwrap();

        let k1 = bucket.for_string_key("k1");
        let k2 = bucket.for_string_key("k2");
        assert!(!k1.exists().unwrap());
        assert!(bucket.read(|view| view.is_empty()).unwrap().unwrap());

        k1.put_string("one").unwrap();
        k2.put_string("two").unwrap();
        assert!(k1.exists().unwrap());

        let (present, keys) = bucket
            .read(|view| Ok((view.contains_key(b"k1")?, view.keys()?)))
            .unwrap()
            .unwrap();
        assert!(present);
        assert_eq!(keys, vec![b"k1".to_vec(), b"k2".to_vec()]);

        k1.delete().unwrap();
        assert!(!k1.exists().unwrap());
        assert_eq!(k1.get_string().unwrap(), None);
        // deleting again is a no-op
        k1.delete().unwrap();

        k2.delete().unwrap();
        let (present, empty) = bucket
            .read(|view| Ok((view.contains_key(b"k2")?, view.is_empty()?)))
            .unwrap()
            .unwrap();
        assert!(!present);
        assert!(empty);

        // the bucket itself survives losing all its keys
        assert!(bucket.exists().unwrap());
    }

    #[test]
    fn test_increments() {
        let (_file, store) = temp_store();
        let bucket = store.root("counters");
        bucket.ensure_path_buckets().unwrap();

        let hits = bucket.for_string_key("hits");
        assert_eq!(hits.increment_u64(5).unwrap(), 5);
        assert_eq!(hits.increment_u64(2).unwrap(), 7);
        assert_eq!(hits.get_u64().unwrap(), Some(7));

        hits.put_u64(u64::MAX).unwrap();
        assert!(matches!(hits.increment_u64(1), Err(Error::Overflow)));
        assert_eq!(hits.get_u64().unwrap(), Some(u64::MAX));

        let balance = bucket.for_string_key("balance");
        assert_eq!(balance.increment_i64(-10).unwrap(), -10);
        assert_eq!(balance.increment_i64(3).unwrap(), -7);

        let missing = store.root("missing").for_string_key("hits");
        assert!(matches!(
            missing.increment_u64(1),
            Err(Error::BucketNotFound(_))
        ));
    }

    #[test]
    fn test_object_values() {
        let (_file, store) = temp_store();
        let bucket = store.at(Path::new(["app", "profiles"]));
        bucket.ensure_path_buckets().unwrap();

        let alice = Profile {
            name: "alice".to_string(),
            age: 31,
        };

        let json = bucket.for_string_key("json");
        json.put_json(&alice).unwrap();
        assert_eq!(json.get_json::<Profile>().unwrap(), Some(alice.clone()));
        assert_eq!(
            json.get_string().unwrap().as_deref(),
            Some(r#"{"name":"alice","age":31}"#)
        );

        let binary = bucket.for_string_key("binary");
        binary.put_binary(&alice).unwrap();
        assert_eq!(binary.get_binary::<Profile>().unwrap(), Some(alice));

        let text = bucket.for_string_key("text");
        text.put_text(&Ipv4Addr::LOCALHOST).unwrap();
        assert_eq!(
            text.get_text::<Ipv4Addr>().unwrap(),
            Some(Ipv4Addr::LOCALHOST)
        );
        assert!(matches!(
            json.get_text::<Ipv4Addr>(),
            Err(Error::Unmarshal(_))
        ));
    }

    #[test]
    fn test_signed_keys_scan_in_numeric_order() {
        let (_file, store) = temp_store();
        let bucket = store.root("events");
        bucket.ensure_path_buckets().unwrap();

        let keys = [0, i64::MAX, -1, 128, i64::MIN, -128, 1, i64::MIN + 1, i64::MAX - 1];
        for key in keys {
            bucket.for_i64_key(key).put_i64(key).unwrap();
        }

        let scanned: Vec<i64> = bucket
            .entries()
            .unwrap()
            .iter()
            .map(|(key, _)| I64Key::from_key_bytes(key).unwrap().0)
            .collect();

        let mut expected = keys.to_vec();
        expected.sort();
        assert_eq!(scanned, expected);
    }

    #[test]
    fn test_unsigned_key_range_scan() {
        let (_file, store) = temp_store();
        let bucket = store.root("blocks");
        bucket.ensure_path_buckets().unwrap();

        for height in [1000u64, 5, 256, 70_000, 42] {
            bucket.for_u64_key(height).put_u64(height * 2).unwrap();
        }

        let start = U64Key(40).key_bytes().unwrap();
        let end = U64Key(1000).key_bytes().unwrap();
        let in_range = bucket
            .read(|view| view.entries_between(&start, &end))
            .unwrap()
            .unwrap();

        let heights: Vec<u64> = in_range
            .iter()
            .map(|(key, _)| U64Key::from_key_bytes(key).unwrap().0)
            .collect();
        assert_eq!(heights, vec![42, 256]);
    }

    #[test]
    fn test_marshaled_keys() {
        let (_file, store) = temp_store();
        let bucket = store.root("keys");
        bucket.ensure_path_buckets().unwrap();

        let text = bucket.for_text_key(&Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(text.key(), b"10.0.0.1");
        text.put_string("text").unwrap();

        let json = bucket.for_json_key(&("a", 1)).unwrap();
        assert_eq!(json.key(), br#"["a",1]"#);
        json.put_string("json").unwrap();

        let binary = bucket.for_binary_key(&7u16).unwrap();
        assert_eq!(binary.key(), &[7u8, 0][..]);
        binary.put_string("binary").unwrap();

        let same_text = bucket
            .for_key(&TextKey(Ipv4Addr::new(10, 0, 0, 1)))
            .unwrap();
        assert_eq!(same_text.get_string().unwrap().as_deref(), Some("text"));

        let same_json = bucket.for_key(&JsonKey(("a", 1))).unwrap();
        assert_eq!(same_json.get_string().unwrap().as_deref(), Some("json"));
    }

    #[test]
    fn test_nested_buckets() {
        let (_file, store) = temp_store();
        let root = store.root("root");
        root.ensure_path_buckets().unwrap();
        root.ensure_nested_bucket("a").unwrap();
        root.ensure_nested_bucket("b").unwrap();

        let a = root.in_nested_bucket("a");
        assert!(a.exists().unwrap());
        a.for_string_key("k").put_string("in a").unwrap();

        // values of nested buckets are not values of the parent
        root.for_string_key("k").put_string("in root").unwrap();
        assert_eq!(root.entries().unwrap().len(), 1);
        assert_eq!(
            root.nested_buckets().unwrap(),
            vec![b"a".to_vec(), b"b".to_vec()]
        );

        root.delete_nested_bucket("a").unwrap();
        assert!(!a.exists().unwrap());
        assert_eq!(a.for_string_key("k").get_string().unwrap(), None);
        assert_eq!(
            root.for_string_key("k").get_string().unwrap().as_deref(),
            Some("in root")
        );

        // an actor for a missing bucket reads nothing and cannot write
        let ghost = root.in_nested_bucket("ghost");
        assert!(ghost.entries().unwrap().is_empty());
        assert!(matches!(
            ghost.for_string_key("k").put_string("v"),
            Err(Error::BucketNotFound(_))
        ));
    }

    #[test]
    fn test_update_spans_one_transaction() {
        let (_file, store) = temp_store();
        let bucket = store.root("batch");
        bucket.ensure_path_buckets().unwrap();

        let written = bucket
            .update(|b| {
                b.put_string(b"a", "1")?;
                b.put_u64(b"b", 2)?;
                b.ensure_nested_bucket(b"child")?;
                assert_eq!(b.get_string(b"a")?.as_deref(), Some("1"));
                b.len()
            })
            .unwrap();
        assert_eq!(written, 2);
        assert!(bucket.in_nested_bucket("child").exists().unwrap());
    }

    #[test]
    fn test_json_bucket() {
        let (_file, store) = temp_store();
        let people = store.json(Path::root("people"));
        people.ensure_path_buckets().unwrap();
        people.ensure_nested_bucket("archived").unwrap();

        let bob = Profile {
            name: "bob".to_string(),
            age: 40,
        };
        people.put(b"bob", &bob).unwrap();
        people.put_nested("archived", b"old-bob", &bob).unwrap();

        assert_eq!(people.get::<Profile>(b"bob").unwrap(), Some(bob.clone()));
        assert_eq!(
            people.get_nested::<Profile>("archived", b"old-bob").unwrap(),
            Some(bob)
        );
        assert_eq!(people.get::<Profile>(b"nobody").unwrap(), None);
    }

    #[test]
    fn test_data_survives_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        {
            let store = Store::create(temp_file.path()).unwrap();
            let bucket = store.at(Path::new(["a", "b"]));
            bucket.ensure_path_buckets().unwrap();
            bucket.for_u64_key(9).put_string("nine").unwrap();
        }

        let store = Store::open(temp_file.path()).unwrap();
        let bucket = store.at(Path::new(["a", "b"]));
        assert_eq!(
            bucket.for_u64_key(9).get_string().unwrap().as_deref(),
            Some("nine")
        );
    }
}
