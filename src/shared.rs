use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Read-only handle shared by several holders
///
/// Cloning duplicates the handle, never the value. Reads go through `&T`
/// from any number of threads. The only write path is
/// [`Shared::make_mut`], which first detaches the writer onto its own copy
/// when other holders are alive. The value is released when the last handle
/// is dropped, and [`Shared::into_unique`] hands it back to the last holder.
pub struct Shared<T>(Arc<T>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Number of handles currently holding the value
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns `true` if both handles hold the same value
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    /// Exclusive access, copying the value first if other holders exist.
    pub fn make_mut(this: &mut Self) -> &mut T
    where
        T: Clone,
    {
        Arc::make_mut(&mut this.0)
    }

    /// Recover exclusive ownership, or get the handle back if other holders
    /// are still alive.
    pub fn into_unique(self) -> Result<T, Self> {
        Arc::try_unwrap(self.0).map_err(Self)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("holders", &self.holders())
            .field("value", &*self.0)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_into_unique() {
        let shared = Shared::new(vec![1, 2, 3]);
        let other = shared.clone();
        assert_eq!(shared.holders(), 2);
        assert_eq!(other.len(), 3);

        let shared = shared.into_unique().unwrap_err();
        drop(other);
        assert_eq!(shared.holders(), 1);
        assert_eq!(shared.into_unique().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_make_mut_detaches_writer() {
        let mut writer = Shared::new(vec![1, 2]);
        let reader = writer.clone();
        assert!(Shared::ptr_eq(&writer, &reader));

        Shared::make_mut(&mut writer).push(3);
        assert!(!Shared::ptr_eq(&writer, &reader));
        assert_eq!(*reader, vec![1, 2]);
        assert_eq!(*writer, vec![1, 2, 3]);
        assert_eq!(reader.holders(), 1);

        // A lone holder writes in place
        let before = &*writer as *const Vec<i32>;
        Shared::make_mut(&mut writer).push(4);
        assert_eq!(&*writer as *const Vec<i32>, before);
    }
}
