//! Source-like rendering of runtime objects
//!
//! Output follows the host language's `deparse()` closely enough for tests
//! and log lines: `c(1L, 2L)`, `list(a = 1, b = "x")`, `character(0)`.

use crate::error::RuntimeResult;
use crate::handle::Handle;
use crate::runtime::Runtime;
use crate::value::{Byte, Complex, NA_INTEGER, NativeTag, Value};

const RESERVED: &[&str] = &[
    "if", "else", "repeat", "while", "function", "for", "next", "break", "TRUE", "FALSE", "NULL",
    "Inf", "NaN", "NA", "in",
];

impl Runtime {
    /// Render `handle` as host-language source text
    pub fn deparse(&self, handle: Handle) -> RuntimeResult<String> {
        let value = self.read(handle, |boxed| boxed.value.clone())?;
        let names = self.names(handle)?;

        let elements = match &value {
            Value::Nil => return Ok("NULL".to_string()),
            Value::Logical(v) => v.iter().map(|&x| logical(x)).collect(),
            Value::Integer(v) => v.iter().map(|&x| integer(x)).collect(),
            Value::Real(v) => v.iter().map(|&x| real(x)).collect(),
            Value::Complex(v) => v.iter().map(|&x| complex(x)).collect(),
            Value::Text(v) => v
                .iter()
                .map(|&text| format!("{:?}", &*self.char_text(text)))
                .collect(),
            Value::Byte(v) => v.iter().map(|&x| byte(x)).collect(),
            Value::List(v) => v
                .iter()
                .map(|&element| self.deparse(element))
                .collect::<RuntimeResult<Vec<_>>>()?,
        };

        let elements = label(elements, names.as_deref());
        Ok(enclose(value.tag(), elements, names.is_some()))
    }
}

fn logical(x: i32) -> String {
    match x {
        NA_INTEGER => "NA".to_string(),
        0 => "FALSE".to_string(),
        _ => "TRUE".to_string(),
    }
}

fn integer(x: i32) -> String {
    match x {
        NA_INTEGER => "NA".to_string(),
        _ => format!("{x}L"),
    }
}

fn real(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x == f64::INFINITY {
        "Inf".to_string()
    } else if x == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        x.to_string()
    }
}

fn complex(x: Complex) -> String {
    let sign = if x.im.is_sign_negative() { '-' } else { '+' };
    format!("{}{}{}i", real(x.re), sign, real(x.im.abs()))
}

fn byte(x: Byte) -> String {
    format!("0x{:02x}", x.0)
}

fn label(elements: Vec<String>, names: Option<&[String]>) -> Vec<String> {
    let Some(names) = names else {
        return elements;
    };

    elements
        .into_iter()
        .zip(names.iter().map(String::as_str).chain(std::iter::repeat("")))
        .map(|(element, name)| match name {
            "" => element,
            name if is_syntactic(name) => format!("{name} = {element}"),
            name => format!("`{name}` = {element}"),
        })
        .collect()
}

fn is_syntactic(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_start = match chars.next() {
        Some('.') => !chars.clone().next().is_some_and(|c| c.is_ascii_digit()),
        Some(c) => c.is_alphabetic(),
        None => false,
    };

    valid_start
        && chars.all(|c| c.is_alphanumeric() || c == '.' || c == '_')
        && !RESERVED.contains(&name)
}

fn enclose(tag: NativeTag, elements: Vec<String>, named: bool) -> String {
    if elements.is_empty() {
        return match tag {
            NativeTag::List => "list()".to_string(),
            NativeTag::Real => "numeric(0)".to_string(),
            NativeTag::Byte => "raw(0)".to_string(),
            other => format!("{}(0)", other.type_name()),
        };
    }

    let joined = elements.join(", ");
    match tag {
        NativeTag::List => format!("list({joined})"),
        NativeTag::Byte if elements.len() == 1 && !named => format!("as.raw({joined})"),
        NativeTag::Byte => format!("as.raw(c({joined}))"),
        _ if elements.len() == 1 && !named => joined,
        _ => format!("c({joined})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_scalar_formats() {
        assert_eq!(integer(3), "3L");
        assert_eq!(integer(NA_INTEGER), "NA");
        assert_eq!(logical(1), "TRUE");
        assert_eq!(logical(NA_INTEGER), "NA");
        assert_eq!(real(1.0), "1");
        assert_eq!(real(2.5), "2.5");
        assert_eq!(real(f64::NEG_INFINITY), "-Inf");
        assert_eq!(complex(Complex::new(1.0, -2.0)), "1-2i");
        assert_eq!(byte(Byte(10)), "0x0a");
    }

    #[test]
    fn test_syntactic_names() {
        assert!(is_syntactic("alpha"));
        assert!(is_syntactic(".hidden"));
        assert!(is_syntactic("a_b.c1"));
        assert!(!is_syntactic("two words"));
        assert!(!is_syntactic(".1x"));
        assert!(!is_syntactic("1x"));
        assert!(!is_syntactic("if"));
    }

    #[test]
    fn test_deparse_vectors() {
        let rt = Runtime::new();
        let empty = rt.allocate(NativeTag::Text, 0).unwrap();
        assert_eq!(rt.deparse(empty).unwrap(), "character(0)");

        let reals = rt.allocate(NativeTag::Real, 2).unwrap();
        rt.with_slots_mut(reals, |slots: &mut [f64]| slots.copy_from_slice(&[1.5, f64::NAN]))
            .unwrap();
        assert_snapshot!(rt.deparse(reals).unwrap(), @"c(1.5, NaN)");

        let raw = rt.allocate(NativeTag::Byte, 1).unwrap();
        assert_eq!(rt.deparse(raw).unwrap(), "as.raw(0x00)");

        assert_eq!(rt.deparse(Handle::NIL).unwrap(), "NULL");
    }

    #[test]
    fn test_deparse_named_list() {
        let rt = Runtime::new();
        let list = rt.protect(rt.allocate(NativeTag::List, 2).unwrap());
        let text = rt.make_string("x").unwrap();
        rt.set_vector_elt(list.handle(), 1, text).unwrap();

        let names = rt.allocate(NativeTag::Text, 2).unwrap();
        rt.set_string_elt(names, 0, rt.intern_text("first item"))
            .unwrap();
        rt.set_string_elt(names, 1, rt.intern_text("b")).unwrap();
        rt.set_attribute(list.handle(), rt.names_symbol(), names)
            .unwrap();

        assert_snapshot!(
            rt.deparse(list.handle()).unwrap(),
            @r#"list(`first item` = NULL, b = "x")"#
        );
    }
}
