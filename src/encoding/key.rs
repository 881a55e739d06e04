//! Storage key layout for the bucket tree.
//!
//! redb tables are flat, so bucket paths are flattened into key prefixes:
//!
//! Path:  ([0x01][name_len: u32 BE][name])*
//! Entry: [path][0x00][key]
//!
//! Every value of a bucket shares the prefix `[path][0x00]`, and everything
//! below a bucket (values, nested buckets and their values) shares `[path]`.

use crate::buckets::Path;
use crate::error::EncodingError;

pub type Result<T> = std::result::Result<T, EncodingError>;

/// Tag byte opening each bucket name in an encoded path.
pub const BUCKET_TAG: u8 = 0x01;

/// Tag byte separating an encoded path from an entry key.
pub const ENTRY_TAG: u8 = 0x00;

fn push_segment(buf: &mut Vec<u8>, name: &[u8]) -> Result<()> {
    let name_len: u32 = name
        .len()
        .try_into()
        .map_err(|_| EncodingError::InvalidKeyLayout("Bucket name too long".to_string()))?;

    buf.push(BUCKET_TAG);
    buf.extend_from_slice(&name_len.to_be_bytes());
    buf.extend_from_slice(name);
    Ok(())
}

/// Encodes a bucket path. This is also the row key of the bucket itself.
pub fn encode_path(path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(path.iter().map(|name| 5 + name.len()).sum());
    for name in path.iter() {
        push_segment(&mut buf, name)?;
    }
    Ok(buf)
}

/// Encodes the path of `name` nested under an already encoded parent path.
pub fn encode_child(parent: &[u8], name: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(parent.len() + 5 + name.len());
    buf.extend_from_slice(parent);
    push_segment(&mut buf, name)?;
    Ok(buf)
}

/// Builds the prefix shared by every value stored directly in `path`.
pub fn entry_prefix(path: &Path) -> Result<Vec<u8>> {
    let mut buf = encode_path(path)?;
    buf.push(ENTRY_TAG);
    Ok(buf)
}

/// Appends `key` to a prefix built by [`entry_prefix`].
pub fn encode_entry_key(prefix: &[u8], key: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(prefix.len() + key.len());
    buf.extend_from_slice(prefix);
    buf.extend_from_slice(key);
    buf
}

/// Strips an entry prefix from a stored key, returning the caller's key.
pub fn decode_entry_key<'a>(prefix: &[u8], raw: &'a [u8]) -> Result<&'a [u8]> {
    raw.strip_prefix(prefix).ok_or_else(|| {
        EncodingError::InvalidKeyLayout("Entry key outside of bucket prefix".to_string())
    })
}

/// Decodes an encoded path back into its bucket names.
pub fn decode_path(mut encoded: &[u8]) -> Result<Path> {
    let mut names = Vec::new();
    while !encoded.is_empty() {
        let (name, rest) = split_segment(encoded)?;
        names.push(name.to_vec());
        encoded = rest;
    }
    Ok(Path::from(names))
}

/// Splits the first bucket name off an encoded path.
pub fn split_segment(encoded: &[u8]) -> Result<(&[u8], &[u8])> {
    match encoded.first() {
        Some(&BUCKET_TAG) => {}
        Some(tag) => {
            return Err(EncodingError::InvalidKeyLayout(format!(
                "Unexpected tag byte {:#04x}",
                tag
            )))
        }
        None => {
            return Err(EncodingError::InvalidKeyLayout(
                "Missing bucket segment".to_string(),
            ))
        }
    }

    if encoded.len() < 5 {
        return Err(EncodingError::InvalidKeyLayout(
            "Truncated segment length".to_string(),
        ));
    }
    let name_len = u32::from_be_bytes([encoded[1], encoded[2], encoded[3], encoded[4]]) as usize;
    let rest = &encoded[5..];
    if rest.len() < name_len {
        return Err(EncodingError::InvalidKeyLayout(
            "Truncated bucket name".to_string(),
        ));
    }

    Ok(rest.split_at(name_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path() {
        let encoded = encode_path(&Path::new(["ab", "c"])).unwrap();
        assert_eq!(
            encoded,
            vec![1, 0, 0, 0, 2, b'a', b'b', 1, 0, 0, 0, 1, b'c']
        );
        assert_eq!(decode_path(&encoded).unwrap(), Path::new(["ab", "c"]));
    }

    #[test]
    fn test_child_matches_nested_path() {
        let parent = encode_path(&Path::root("root")).unwrap();
        let child = encode_child(&parent, b"leaf").unwrap();
        assert_eq!(child, encode_path(&Path::new(["root", "leaf"])).unwrap());
    }

    #[test]
    fn test_names_are_not_prefixes_of_each_other() {
        let short = encode_path(&Path::root("a")).unwrap();
        let long = encode_path(&Path::root("ab")).unwrap();
        assert!(!long.starts_with(&short));
    }

    #[test]
    fn test_entry_prefix_separates_values_from_children() {
        let path = Path::root("root");
        let prefix = entry_prefix(&path).unwrap();
        let child = encode_path(&path.nest("child")).unwrap();

        assert!(prefix.starts_with(&encode_path(&path).unwrap()));
        assert!(!child.starts_with(&prefix));

        let raw = encode_entry_key(&prefix, b"k1");
        assert_eq!(decode_entry_key(&prefix, &raw).unwrap(), b"k1");
        assert!(decode_entry_key(&prefix, &child).is_err());
    }

    #[test]
    fn test_decode_path_rejects_bad_layouts() {
        assert!(decode_path(&[0x02, 0, 0, 0, 0]).is_err());
        assert!(decode_path(&[0x01, 0, 0]).is_err());
        assert!(decode_path(&[0x01, 0, 0, 0, 3, b'a']).is_err());
        assert_eq!(decode_path(&[]).unwrap(), Path::default());
    }
}
