//! Bucket paths.

use std::fmt;

/// An ordered sequence of bucket names, walked from a top-level bucket down
/// through its nested buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    buckets: Vec<Vec<u8>>,
}

impl Path {
    /// Creates a path from one or more bucket names.
    pub fn new<I, B>(buckets: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self {
            buckets: buckets.into_iter().map(|b| b.as_ref().to_vec()).collect(),
        }
    }

    /// Creates a path holding a single top-level bucket.
    pub fn root(bucket: impl AsRef<[u8]>) -> Self {
        Self::new([bucket])
    }

    /// Returns a new path with `bucket` appended. `self` is left unchanged.
    pub fn nest(&self, bucket: impl AsRef<[u8]>) -> Self {
        let mut buckets = Vec::with_capacity(self.buckets.len() + 1);
        buckets.extend(self.buckets.iter().cloned());
        buckets.push(bucket.as_ref().to_vec());
        Self { buckets }
    }

    /// Returns the path without its last bucket, if it has more than one.
    pub fn parent(&self) -> Option<Self> {
        match self.buckets.len() {
            0 | 1 => None,
            n => Some(Self {
                buckets: self.buckets[..n - 1].to_vec(),
            }),
        }
    }

    /// Returns the last bucket name.
    pub fn last(&self) -> Option<&[u8]> {
        self.buckets.last().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.buckets.iter().map(Vec::as_slice)
    }
}

impl From<Vec<Vec<u8>>> for Path {
    fn from(buckets: Vec<Vec<u8>>) -> Self {
        Self { buckets }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, bucket) in self.buckets.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", String::from_utf8_lossy(bucket))?;
        }
        write!(f, "]")
    }
}
