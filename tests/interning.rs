//! Integration tests for session-scoped string and path interning.
//!
//! The write and read sides open matching scopes over the same byte
//! sequence; the tests cover canonicalization under the scope comparer,
//! scope teardown, nesting rejection, and path component sharing.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::io::Cursor;

use build_protocol::{Result, StringComparer, StringDict, TranslationError, Translator};

type MemoryTranslator = Translator<Cursor<Vec<u8>>>;

fn writer() -> MemoryTranslator {
    Translator::write_to(Cursor::new(Vec::new()))
}

fn reader_over(writer: MemoryTranslator) -> MemoryTranslator {
    Translator::read_from(Cursor::new(writer.into_inner().into_inner()))
}

#[test]
fn test_case_insensitive_scope_canonicalizes_to_first_spelling() {
    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
        let mut first = Some("FooBar".to_string());
        let mut second = Some("FOOBAR".to_string());
        t.intern_string(&mut first)?;
        t.intern_string(&mut second)?;
        Ok(())
    })
    .unwrap();

    let mut r = reader_over(w);
    let (mut first, mut second) = (None, None);
    r.with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
        t.intern_string(&mut first)?;
        t.intern_string(&mut second)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(first.as_deref(), Some("FooBar"));
    // The repeat resolves to the first-seen spelling.
    assert_eq!(second.as_deref(), Some("FooBar"));
}

#[test]
fn test_case_sensitive_scope_keeps_distinct_spellings() {
    let mut w = writer();
    w.with_interning(StringComparer::Ordinal, 2, |t| {
        let mut first = Some("FooBar".to_string());
        let mut second = Some("FOOBAR".to_string());
        t.intern_string(&mut first)?;
        t.intern_string(&mut second)?;
        Ok(())
    })
    .unwrap();

    let mut r = reader_over(w);
    let (mut first, mut second) = (None, None);
    r.with_interning(StringComparer::Ordinal, 2, |t| {
        t.intern_string(&mut first)?;
        t.intern_string(&mut second)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(first.as_deref(), Some("FooBar"));
    assert_eq!(second.as_deref(), Some("FOOBAR"));
}

#[test]
fn test_intern_empty_and_null_inside_scope() {
    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
        let mut empty = Some(String::new());
        let mut empty_again = Some(String::new());
        let mut null = None;
        t.intern_string(&mut empty)?;
        t.intern_string(&mut empty_again)?;
        t.intern_string(&mut null)?;
        Ok(())
    })
    .unwrap();

    let mut r = reader_over(w);
    let (mut empty, mut empty_again, mut null) =
        (None, None, Some("stale".to_string()));
    r.with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
        t.intern_string(&mut empty)?;
        t.intern_string(&mut empty_again)?;
        t.intern_string(&mut null)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(empty.as_deref(), Some(""));
    assert_eq!(empty_again.as_deref(), Some(""));
    assert_eq!(null, None);
}

#[test]
fn test_intern_calls_outside_scope_match_plain_translation() {
    // Identical payload written with and without the intern entry points;
    // outside a scope the bytes must be indistinguishable.
    let mut interned = writer();
    let mut plain = writer();
    let mut value = Some("src/main.proj".to_string());
    interned.intern_string(&mut value.clone()).unwrap();
    interned.intern_path(&mut value.clone()).unwrap();
    plain.translate_string(&mut value.clone()).unwrap();
    plain.translate_string(&mut value).unwrap();

    let interned_bytes = interned.into_inner().into_inner();
    let plain_bytes = plain.into_inner().into_inner();
    assert_eq!(interned_bytes, plain_bytes);
}

#[test]
fn test_scope_with_no_intern_calls_leaves_stream_untouched() {
    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 8, |_| Ok(()))
        .unwrap();
    assert!(w.into_inner().into_inner().is_empty());

    let mut r = Translator::read_from(Cursor::new(Vec::new()));
    r.with_interning(StringComparer::OrdinalIgnoreCase, 8, |_| Ok(()))
        .unwrap();
}

#[test]
fn test_nested_scope_is_rejected_without_breaking_outer_scope() {
    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
        let err = t
            .with_interning(StringComparer::Ordinal, 2, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, TranslationError::NestedInternScope));

        // The outer scope keeps working after the rejected attempt.
        let mut value = Some("still-interning".to_string());
        t.intern_string(&mut value)?;
        Ok(())
    })
    .unwrap();

    let mut r = reader_over(w);
    let mut decoded = None;
    r.with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
        let err = t
            .with_interning(StringComparer::Ordinal, 2, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, TranslationError::NestedInternScope));
        t.intern_string(&mut decoded)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(decoded.as_deref(), Some("still-interning"));
}

#[test]
fn test_failed_scope_body_tears_down_session() {
    let mut w = writer();
    let err = w
        .with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
            let mut value = Some("partial".to_string());
            t.intern_string(&mut value)?;
            Err::<(), _>(TranslationError::UnsupportedType("synthetic failure"))
        })
        .unwrap_err();
    assert!(matches!(err, TranslationError::UnsupportedType(_)));

    // A fresh scope opens cleanly after the failure.
    w.with_interning(StringComparer::Ordinal, 2, |t| {
        let mut value = Some("fresh".to_string());
        t.intern_string(&mut value)?;
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_sequential_scopes_reset_comparer_and_table() {
    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
        let mut first = Some("Alpha".to_string());
        let mut second = Some("ALPHA".to_string());
        t.intern_string(&mut first)?;
        t.intern_string(&mut second)?;
        Ok(())
    })
    .unwrap();
    w.with_interning(StringComparer::Ordinal, 2, |t| {
        let mut first = Some("Alpha".to_string());
        let mut second = Some("ALPHA".to_string());
        t.intern_string(&mut first)?;
        t.intern_string(&mut second)?;
        Ok(())
    })
    .unwrap();

    let mut r = reader_over(w);
    let (mut a1, mut a2) = (None, None);
    r.with_interning(StringComparer::OrdinalIgnoreCase, 2, |t| {
        t.intern_string(&mut a1)?;
        t.intern_string(&mut a2)?;
        Ok(())
    })
    .unwrap();
    let (mut b1, mut b2) = (None, None);
    r.with_interning(StringComparer::Ordinal, 2, |t| {
        t.intern_string(&mut b1)?;
        t.intern_string(&mut b2)?;
        Ok(())
    })
    .unwrap();

    // First scope folds case; the second starts a fresh table and does not.
    assert_eq!(a1.as_deref(), Some("Alpha"));
    assert_eq!(a2.as_deref(), Some("Alpha"));
    assert_eq!(b1.as_deref(), Some("Alpha"));
    assert_eq!(b2.as_deref(), Some("ALPHA"));
}

#[test]
fn test_path_components_dedup_against_later_full_path() {
    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        let mut directory = Some("C:/SRC/A/".to_string());
        let mut file_name = Some("B.DLL".to_string());
        let mut full_path = Some("c:/src/a/b.dll".to_string());
        t.intern_string(&mut directory)?;
        t.intern_string(&mut file_name)?;
        t.intern_path(&mut full_path)?;
        Ok(())
    })
    .unwrap();

    let mut r = reader_over(w);
    let (mut directory, mut file_name, mut full_path) = (None, None, None);
    r.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        t.intern_string(&mut directory)?;
        t.intern_string(&mut file_name)?;
        t.intern_path(&mut full_path)?;
        Ok(())
    })
    .unwrap();

    let directory = directory.unwrap();
    let file_name = file_name.unwrap();
    // The path reconstructs from the components' first-seen spellings.
    assert_eq!(full_path.unwrap(), format!("{directory}{file_name}"));
    assert_eq!(directory, "C:/SRC/A/");
    assert_eq!(file_name, "B.DLL");
}

#[test]
fn test_full_path_dedups_against_later_components() {
    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        let mut full_path = Some("c:/src/a/b.dll".to_string());
        let mut directory = Some("C:/SRC/A/".to_string());
        let mut file_name = Some("B.DLL".to_string());
        t.intern_path(&mut full_path)?;
        t.intern_string(&mut directory)?;
        t.intern_string(&mut file_name)?;
        Ok(())
    })
    .unwrap();

    let mut r = reader_over(w);
    let (mut full_path, mut directory, mut file_name) = (None, None, None);
    r.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        t.intern_path(&mut full_path)?;
        t.intern_string(&mut directory)?;
        t.intern_string(&mut file_name)?;
        Ok(())
    })
    .unwrap();

    let full_path = full_path.unwrap();
    assert_eq!(full_path, "c:/src/a/b.dll");
    // Whole strings seen later resolve to the component spellings already in
    // the table.
    assert_eq!(format!("{}{}", directory.unwrap(), file_name.unwrap()), full_path);
}

#[test]
fn test_backslash_path_splits_at_final_separator() {
    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        let mut first = Some(r"obj\Debug\ProjectA.dll".to_string());
        let mut second = Some(r"obj\Debug\ProjectB.dll".to_string());
        t.intern_path(&mut first)?;
        t.intern_path(&mut second)?;
        Ok(())
    })
    .unwrap();

    let mut r = reader_over(w);
    let (mut first, mut second) = (None, None);
    r.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        t.intern_path(&mut first)?;
        t.intern_path(&mut second)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(first.as_deref(), Some(r"obj\Debug\ProjectA.dll"));
    assert_eq!(second.as_deref(), Some(r"obj\Debug\ProjectB.dll"));
}

#[test]
fn test_mixed_plain_and_interned_calls_in_one_packet() {
    let mut w = writer();
    let mut before = Some("before".to_string());
    w.translate_string(&mut before).unwrap();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        let mut plain = Some("plain".to_string());
        let mut interned = Some("shared".to_string());
        let mut count = 42i32;
        let mut repeat = Some("SHARED".to_string());
        t.translate_string(&mut plain)?;
        t.intern_string(&mut interned)?;
        t.translate_i32(&mut count)?;
        t.intern_string(&mut repeat)?;
        Ok(())
    })
    .unwrap();
    let mut after = Some("after".to_string());
    w.translate_string(&mut after).unwrap();

    let mut r = reader_over(w);
    let mut before = None;
    r.translate_string(&mut before).unwrap();
    let (mut plain, mut interned, mut count, mut repeat) = (None, None, 0i32, None);
    r.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        t.translate_string(&mut plain)?;
        t.intern_string(&mut interned)?;
        t.translate_i32(&mut count)?;
        t.intern_string(&mut repeat)?;
        Ok(())
    })
    .unwrap();
    let mut after = None;
    r.translate_string(&mut after).unwrap();

    assert_eq!(before.as_deref(), Some("before"));
    assert_eq!(plain.as_deref(), Some("plain"));
    assert_eq!(interned.as_deref(), Some("shared"));
    assert_eq!(count, 42);
    assert_eq!(repeat.as_deref(), Some("shared"));
    assert_eq!(after.as_deref(), Some("after"));
}

#[test]
fn test_interned_string_vec_roundtrip() {
    let original = vec![
        "obj/Debug/A.dll".to_string(),
        "OBJ/DEBUG/A.DLL".to_string(),
        "obj/Debug/B.dll".to_string(),
    ];

    let mut w = writer();
    w.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        let mut value = Some(original.clone());
        t.intern_string_vec(&mut value)
    })
    .unwrap();

    let mut r = reader_over(w);
    let mut decoded = None;
    r.with_interning(StringComparer::OrdinalIgnoreCase, 4, |t| {
        t.intern_string_vec(&mut decoded)
    })
    .unwrap();

    let decoded = decoded.expect("vector should not be null");
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[0], "obj/Debug/A.dll");
    // Canonicalized to the first sighting under the scope comparer.
    assert_eq!(decoded[1], "obj/Debug/A.dll");
    assert_eq!(decoded[2], "obj/Debug/B.dll");
}

#[test]
fn test_interned_string_dictionary_roundtrip() {
    let mut dict = StringDict::new(StringComparer::OrdinalIgnoreCase);
    dict.insert("Configuration".to_string(), "Debug".to_string());
    dict.insert("Platform".to_string(), "AnyCPU".to_string());

    let mut w = writer();
    w.with_interning(StringComparer::Ordinal, 4, |t| {
        let mut value = Some(dict);
        t.intern_string_dictionary(&mut value, StringComparer::OrdinalIgnoreCase)
    })
    .unwrap();

    let mut r = reader_over(w);
    let mut decoded = None;
    r.with_interning(StringComparer::Ordinal, 4, |t| {
        t.intern_string_dictionary(&mut decoded, StringComparer::OrdinalIgnoreCase)
    })
    .unwrap();

    let decoded = decoded.expect("dictionary should not be null");
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.get("configuration"), Some(&"Debug".to_string()));
    assert_eq!(decoded.get("PLATFORM"), Some(&"AnyCPU".to_string()));
}

#[test]
fn test_interned_dictionary_with_factory_values() {
    use std::io::{Read, Write};
    use build_protocol::Translatable;

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct Entry {
        weight: i32,
    }

    impl Entry {
        fn factory<S: Read + Write>(translator: &mut Translator<S>) -> Result<Entry> {
            let mut entry = Entry::default();
            entry.translate(translator)?;
            Ok(entry)
        }
    }

    impl Translatable for Entry {
        fn translate<S: Read + Write>(&mut self, translator: &mut Translator<S>) -> Result<()> {
            translator.translate_i32(&mut self.weight)
        }
    }

    let mut dict = StringDict::new(StringComparer::Ordinal);
    dict.insert("first".to_string(), Entry { weight: 1 });
    dict.insert("second".to_string(), Entry { weight: 2 });

    let mut w = writer();
    w.with_interning(StringComparer::Ordinal, 4, |t| {
        let mut value = Some(dict);
        t.intern_dictionary_with(&mut value, StringComparer::Ordinal, Entry::factory)
    })
    .unwrap();

    let mut r = reader_over(w);
    let mut decoded = None;
    r.with_interning(StringComparer::Ordinal, 4, |t| {
        t.intern_dictionary_with(&mut decoded, StringComparer::Ordinal, Entry::factory)
    })
    .unwrap();

    let decoded = decoded.expect("dictionary should not be null");
    assert_eq!(decoded.get("first"), Some(&Entry { weight: 1 }));
    assert_eq!(decoded.get("second"), Some(&Entry { weight: 2 }));
}
