// src/macros.rs

/// `s!()` is an empty `String`, `s!(x)` is `String::from(x)`.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Concatenate anything `AsRef<str>` into one `String`, allocated once.
/// Markdown rules glue delimiters around converted content with this.
#[macro_export]
macro_rules! join {
    ($($part:expr),+ $(,)?) => {
        [$(::core::convert::AsRef::<str>::as_ref(&$part)),+].concat()
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn join_mixes_borrowed_and_owned_parts() {
        let owned = String::from("bold");
        let fence = "**";
        assert_eq!(join!(fence, owned, fence), "**bold**");
        assert_eq!(join!("#".repeat(2), " ", &owned, "\n"), "## bold\n");
        assert_eq!(join!("only"), "only");
        // operands are borrowed, not moved
        assert_eq!(owned, "bold");
    }

    #[test]
    fn s_covers_empty_and_conversions() {
        assert!(s!().is_empty());
        assert_eq!(s!("x"), "x");
        assert_eq!(s!('y'), "y");
    }
}
