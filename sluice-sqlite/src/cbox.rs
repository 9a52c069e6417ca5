use std::ops::{Deref, DerefMut};

pub(crate) trait NullCheck {
    fn is_null(&self) -> bool;
}

impl<T> NullCheck for *const T {
    fn is_null(&self) -> bool {
        (*self).is_null()
    }
}

impl<T> NullCheck for *mut T {
    fn is_null(&self) -> bool {
        (*self).is_null()
    }
}

/// Owner of a pointer allocated by the C library, released with `dealloc` on drop.
#[derive(Debug)]
pub(crate) struct CBox<T: NullCheck + Copy> {
    pub(crate) ptr: T,
    dealloc: fn(T),
}

impl<T: NullCheck + Copy> CBox<T> {
    pub fn new(ptr: T, dealloc: fn(T)) -> Self {
        Self { ptr, dealloc }
    }
}

impl<T: NullCheck + Copy> Drop for CBox<T> {
    fn drop(&mut self) {
        if !NullCheck::is_null(&self.ptr) {
            (self.dealloc)(self.ptr);
        }
    }
}

impl<T: NullCheck + Copy> Deref for CBox<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.ptr
    }
}

impl<T: NullCheck + Copy> DerefMut for CBox<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ptr
    }
}

unsafe impl<T: NullCheck + Copy> Send for CBox<T> {}
