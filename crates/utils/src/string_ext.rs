/// Extends string types with useful functions
pub trait StringExt {
    /// Replace every whitespace character with a dash
    ///
    /// Plotting tools such as Visit refuse names containing whitespace.
    ///
    /// ```rust
    /// # use gridkit_utils::StringExt;
    /// assert_eq!("electric field z".dashed(), "electric-field-z".to_string());
    /// ```
    fn dashed(&self) -> String;
}

impl<T: AsRef<str>> StringExt for T {
    fn dashed(&self) -> String {
        self.as_ref()
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect()
    }
}
