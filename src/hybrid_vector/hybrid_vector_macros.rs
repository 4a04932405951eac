/// Internal helper macro used by `hybrid_vec!` to count the number of
/// comma-separated expressions at compile time.
///
/// # Examples
/// ```
/// use hybrid_containers::*;
/// const N: usize = __count!(1, 2, 3, 4);
/// assert_eq!(N, 4);
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! __count {
    () => { 0usize };
    ($head:expr $(, $tail:expr)*) => {
        1usize + $crate::__count!($($tail),*)
    };
}

/// Creates a `HybridVector` from a list of elements, optionally with an explicit inline capacity.
///
/// ## Forms
///
/// ### Empty vector
/// ```
/// use hybrid_containers::*;
/// let v: HybridVector<String, 3> = hybrid_vec![];
/// ```
///
/// ### Empty vector with explicit inline capacity
/// ```
/// use hybrid_containers::*;
/// let mut v = hybrid_vec![8;];
/// v.push(42);
/// assert_eq!(v.capacity(), 8);
/// ```
///
/// ### Vector from elements (inline capacity inferred from the element count)
/// ```
/// use hybrid_containers::*;
/// let v = hybrid_vec![1, 2, 3];
/// assert_eq!(v.inline_capacity(), 3);
/// assert!(v.is_inline());
/// ```
///
/// ### Vector from elements with explicit inline capacity
/// ```
/// use hybrid_containers::*;
/// let v = hybrid_vec![8; 1, 2, 3];
/// assert!(v.is_inline());
///
/// let spilled = hybrid_vec![2; 1, 2, 3];
/// assert!(!spilled.is_inline());
/// assert_eq!(spilled, &[1, 2, 3]);
/// ```
///
/// More elements than the inline capacity is not an error: the extra elements spill to the heap.
#[macro_export]
macro_rules! hybrid_vec {
    () => {
        $crate::HybridVector::new()
    };

    ($cap:expr;) => {
        $crate::HybridVector::<_, { $cap }>::new()
    };

    ($($elem:expr),+ $(,)?) => {{
        const COUNT: usize = $crate::__count!($($elem),*);
        $crate::HybridVector::<_, COUNT>::from([$($elem),*])
    }};

    ($cap:expr; $($elem:expr),+ $(,)?) => {{
        $crate::HybridVector::<_, { $cap }>::from([$($elem),*])
    }};
}
