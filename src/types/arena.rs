use tracing::debug;

use super::error::PoolError;

/// Default starting capacity for every pool kind.
pub const DEFAULT_CAPACITY: usize = 256;

/// Positions are `u32`, so no pool may hold more than this many slots.
pub(crate) const MAX_SLOTS: usize = u32::MAX as usize;

/// Contiguous growable store addressed by integer position.
///
/// The logical capacity doubles whenever an append would overflow it. Storage
/// is reserved lazily with `try_reserve_exact`, so a failed growth returns
/// [`PoolError::AllocationFailure`] and leaves both the contents and the
/// capacity exactly as they were.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    items: Vec<T>,
    capacity: usize,
    name: &'static str,
}

impl<T> Arena<T> {
    pub(crate) fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.min(MAX_SLOTS),
            name,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn get(&self, position: u32) -> Option<&T> {
        self.items.get(position as usize)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, position: u32) -> Option<&mut T> {
        self.items.get_mut(position as usize)
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Append one element and return its position.
    pub(crate) fn push(&mut self, item: T) -> Result<u32, PoolError> {
        let position = self.reserve_for(1)?;
        self.items.push(item);
        Ok(position)
    }

    /// Double the logical capacity once.
    pub(crate) fn grow(&mut self) -> Result<(), PoolError> {
        let target = next_capacity(self.capacity).ok_or(PoolError::AllocationFailure {
            pool: self.name,
            requested: self.capacity.saturating_mul(2),
        })?;
        self.commit(target)
    }

    /// Make room for `additional` more elements, doubling as many times as
    /// needed. Returns the position the first new element will occupy.
    pub(crate) fn reserve_for(&mut self, additional: usize) -> Result<u32, PoolError> {
        let position = self.items.len();
        let required = position
            .checked_add(additional)
            .filter(|&required| required <= MAX_SLOTS)
            .ok_or(PoolError::AllocationFailure {
                pool: self.name,
                requested: position.saturating_add(additional),
            })?;

        let mut target = self.capacity;
        while target < required {
            target = next_capacity(target).ok_or(PoolError::AllocationFailure {
                pool: self.name,
                requested: required,
            })?;
        }
        if target != self.capacity {
            self.commit(target)?;
        } else if self.items.capacity() < required {
            self.reserve_storage(target)?;
        }

        // `required <= MAX_SLOTS` was checked above.
        Ok(position as u32)
    }

    fn commit(&mut self, target: usize) -> Result<(), PoolError> {
        self.reserve_storage(target)?;
        debug!(
            pool = self.name,
            from = self.capacity,
            to = target,
            "growing pool"
        );
        self.capacity = target;
        Ok(())
    }

    fn reserve_storage(&mut self, target: usize) -> Result<(), PoolError> {
        let additional = target.saturating_sub(self.items.len());
        self.items
            .try_reserve_exact(additional)
            .map_err(|_| PoolError::AllocationFailure {
                pool: self.name,
                requested: target,
            })
    }
}

impl<T: Copy> Arena<T> {
    /// Append a run of elements, returning the position of the first one.
    /// Either the whole slice is appended or nothing is.
    pub(crate) fn extend_from_slice(&mut self, items: &[T]) -> Result<u32, PoolError> {
        let position = self.reserve_for(items.len())?;
        self.items.extend_from_slice(items);
        Ok(position)
    }
}

fn next_capacity(current: usize) -> Option<usize> {
    if current >= MAX_SLOTS {
        return None;
    }
    Some(current.saturating_mul(2).clamp(1, MAX_SLOTS))
}
