//! Lenient coercion between primitive wire shapes.
//!
//! The set of bridgeable target types is closed: the integer family, the
//! floating-point family, `bool` and `String`. Whether a type bridges is
//! decided once per type through [`BridgeRegistry::lookup`], never per value.

use crate::wire::WireNode;
use serde_json::Number;
use std::any::{Any, TypeId};
use std::fmt;

/// Tag of a bridgeable primitive target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeType {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Bool,
    String,
}

impl BridgeType {
    /// Tag for `V`, or `None` when `V` is not bridgeable.
    pub fn of<V: 'static>() -> Option<Self> {
        let id = TypeId::of::<V>();
        let table = [
            (TypeId::of::<i8>(), BridgeType::I8),
            (TypeId::of::<i16>(), BridgeType::I16),
            (TypeId::of::<i32>(), BridgeType::I32),
            (TypeId::of::<i64>(), BridgeType::I64),
            (TypeId::of::<isize>(), BridgeType::Isize),
            (TypeId::of::<u8>(), BridgeType::U8),
            (TypeId::of::<u16>(), BridgeType::U16),
            (TypeId::of::<u32>(), BridgeType::U32),
            (TypeId::of::<u64>(), BridgeType::U64),
            (TypeId::of::<usize>(), BridgeType::Usize),
            (TypeId::of::<f32>(), BridgeType::F32),
            (TypeId::of::<f64>(), BridgeType::F64),
            (TypeId::of::<bool>(), BridgeType::Bool),
            (TypeId::of::<String>(), BridgeType::String),
        ];
        table
            .iter()
            .find(|(type_id, _)| *type_id == id)
            .map(|(_, tag)| *tag)
    }

    pub fn is_integer(&self) -> bool {
        !matches!(
            self,
            BridgeType::F32 | BridgeType::F64 | BridgeType::Bool | BridgeType::String
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, BridgeType::F32 | BridgeType::F64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BridgeType::I8 => "i8",
            BridgeType::I16 => "i16",
            BridgeType::I32 => "i32",
            BridgeType::I64 => "i64",
            BridgeType::Isize => "isize",
            BridgeType::U8 => "u8",
            BridgeType::U16 => "u16",
            BridgeType::U32 => "u32",
            BridgeType::U64 => "u64",
            BridgeType::Usize => "usize",
            BridgeType::F32 => "f32",
            BridgeType::F64 => "f64",
            BridgeType::Bool => "bool",
            BridgeType::String => "String",
        }
    }

    /// Coerce `node` into this type, returning the result as a canonical
    /// wire node instead of a Rust value.
    pub fn coerce_node(&self, node: &WireNode) -> Option<WireNode> {
        match self {
            BridgeType::I8 => coerce_int::<i8>(node).map(|v| WireNode::from(i64::from(v))),
            BridgeType::I16 => coerce_int::<i16>(node).map(|v| WireNode::from(i64::from(v))),
            BridgeType::I32 => coerce_int::<i32>(node).map(|v| WireNode::from(i64::from(v))),
            BridgeType::I64 => coerce_int::<i64>(node).map(WireNode::from),
            BridgeType::Isize => coerce_int::<isize>(node).map(|v| WireNode::from(v as i64)),
            BridgeType::U8 => coerce_int::<u8>(node).map(|v| WireNode::from(u64::from(v))),
            BridgeType::U16 => coerce_int::<u16>(node).map(|v| WireNode::from(u64::from(v))),
            BridgeType::U32 => coerce_int::<u32>(node).map(|v| WireNode::from(u64::from(v))),
            BridgeType::U64 => coerce_int::<u64>(node).map(WireNode::from),
            BridgeType::Usize => coerce_int::<usize>(node).map(|v| WireNode::from(v as u64)),
            BridgeType::F32 => coerce_f32(node).map(|v| WireNode::from(f64::from(v))),
            BridgeType::F64 => coerce_f64(node).map(WireNode::from),
            BridgeType::Bool => coerce_bool(node).map(WireNode::from),
            BridgeType::String => coerce_string(node).map(WireNode::from),
        }
    }

    /// Coercion function for this tag, typed as `V`. `None` when `V` is not
    /// the type the tag stands for.
    fn coercion_fn<V: 'static>(&self) -> Option<CoerceFn<V>> {
        match self {
            BridgeType::I8 => retype(coerce_int::<i8>),
            BridgeType::I16 => retype(coerce_int::<i16>),
            BridgeType::I32 => retype(coerce_int::<i32>),
            BridgeType::I64 => retype(coerce_int::<i64>),
            BridgeType::Isize => retype(coerce_int::<isize>),
            BridgeType::U8 => retype(coerce_int::<u8>),
            BridgeType::U16 => retype(coerce_int::<u16>),
            BridgeType::U32 => retype(coerce_int::<u32>),
            BridgeType::U64 => retype(coerce_int::<u64>),
            BridgeType::Usize => retype(coerce_int::<usize>),
            BridgeType::F32 => retype(coerce_f32),
            BridgeType::F64 => retype(coerce_f64),
            BridgeType::Bool => retype(coerce_bool),
            BridgeType::String => retype(coerce_string),
        }
    }
}

impl fmt::Display for BridgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Signature of a coercion function for target type `V`
pub type CoerceFn<V> = fn(&WireNode) -> Option<V>;

fn retype<T: 'static, V: 'static>(coerce: CoerceFn<T>) -> Option<CoerceFn<V>> {
    (&coerce as &dyn Any).downcast_ref::<CoerceFn<V>>().copied()
}

/// A coercion function for one target type
#[derive(Debug)]
pub struct Coercion<V> {
    tag: BridgeType,
    coerce: CoerceFn<V>,
}

impl<V> Clone for Coercion<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Coercion<V> {}

impl<V> Coercion<V> {
    /// Build a coercion from an explicit function, for targets whose
    /// representation is chosen at runtime (e.g. schema-driven fields).
    pub fn new(tag: BridgeType, coerce: CoerceFn<V>) -> Self {
        Self { tag, coerce }
    }

    pub fn tag(&self) -> BridgeType {
        self.tag
    }

    /// Attempt the coercion. `None` means the node's shape does not convert.
    pub fn coerce(&self, node: &WireNode) -> Option<V> {
        (self.coerce)(node)
    }
}

/// Closed registry of primitive coercions.
pub struct BridgeRegistry;

impl BridgeRegistry {
    /// Coercion for `V`, if `V` is a bridgeable primitive.
    ///
    /// # Example
    ///
    /// ```
    /// use wirefield::{BridgeRegistry, WireNode};
    ///
    /// let to_int = BridgeRegistry::lookup::<i32>().unwrap();
    /// assert_eq!(to_int.coerce(&WireNode::from("42")), Some(42));
    /// assert!(BridgeRegistry::lookup::<Vec<i32>>().is_none());
    /// ```
    pub fn lookup<V: 'static>() -> Option<Coercion<V>> {
        let tag = BridgeType::of::<V>()?;
        let coerce = tag.coercion_fn::<V>()?;
        Some(Coercion { tag, coerce })
    }

    pub fn is_bridgeable<V: 'static>() -> bool {
        BridgeType::of::<V>().is_some()
    }
}

/// Integral value of a number, if it has one.
fn integral(number: &Number) -> Option<i128> {
    if let Some(i) = number.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = number.as_u64() {
        return Some(i128::from(u));
    }
    number.as_f64().and_then(integral_float)
}

fn integral_float(f: f64) -> Option<i128> {
    // Beyond 2^64 nothing fits any supported width anyway.
    const LIMIT: f64 = 18_446_744_073_709_551_616.0;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < LIMIT {
        Some(f as i128)
    } else {
        None
    }
}

fn coerce_int<T: TryFrom<i128>>(node: &WireNode) -> Option<T> {
    let value = match node {
        WireNode::Number(n) => integral(n)?,
        WireNode::String(s) => {
            let s = s.trim();
            match s.parse::<i128>() {
                Ok(i) => i,
                Err(_) => s.parse::<f64>().ok().and_then(integral_float)?,
            }
        }
        _ => return None,
    };
    T::try_from(value).ok()
}

fn coerce_f64(node: &WireNode) -> Option<f64> {
    let value = match node {
        WireNode::Number(n) => n.as_f64()?,
        WireNode::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn coerce_f32(node: &WireNode) -> Option<f32> {
    let value = coerce_f64(node)? as f32;
    value.is_finite().then_some(value)
}

fn coerce_bool(node: &WireNode) -> Option<bool> {
    match node {
        WireNode::Bool(b) => Some(*b),
        WireNode::Number(n) => match integral(n)? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
        WireNode::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_string(node: &WireNode) -> Option<String> {
    match node {
        WireNode::String(s) => Some(s.clone()),
        WireNode::Number(n) => Some(n.to_string()),
        WireNode::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> WireNode {
        WireNode::from(value)
    }

    #[test]
    fn test_lookup_supported_types() {
        assert_eq!(BridgeRegistry::lookup::<i64>().map(|c| c.tag()), Some(BridgeType::I64));
        assert_eq!(BridgeRegistry::lookup::<u8>().map(|c| c.tag()), Some(BridgeType::U8));
        assert_eq!(BridgeRegistry::lookup::<f32>().map(|c| c.tag()), Some(BridgeType::F32));
        assert_eq!(BridgeRegistry::lookup::<bool>().map(|c| c.tag()), Some(BridgeType::Bool));
        assert_eq!(
            BridgeRegistry::lookup::<String>().map(|c| c.tag()),
            Some(BridgeType::String)
        );
    }

    #[test]
    fn test_lookup_covers_every_tag() {
        fn check<V: 'static>(tag: BridgeType) {
            assert_eq!(BridgeRegistry::lookup::<V>().map(|c| c.tag()), Some(tag));
            assert!(tag.coercion_fn::<V>().is_some());
            assert!(tag.coercion_fn::<Vec<V>>().is_none());
        }
        check::<i8>(BridgeType::I8);
        check::<i16>(BridgeType::I16);
        check::<i32>(BridgeType::I32);
        check::<i64>(BridgeType::I64);
        check::<isize>(BridgeType::Isize);
        check::<u8>(BridgeType::U8);
        check::<u16>(BridgeType::U16);
        check::<u32>(BridgeType::U32);
        check::<u64>(BridgeType::U64);
        check::<usize>(BridgeType::Usize);
        check::<f32>(BridgeType::F32);
        check::<f64>(BridgeType::F64);
        check::<bool>(BridgeType::Bool);
        check::<String>(BridgeType::String);
    }

    #[test]
    fn test_lookup_unsupported_types() {
        assert!(BridgeRegistry::lookup::<Vec<i64>>().is_none());
        assert!(BridgeRegistry::lookup::<Option<i64>>().is_none());
        assert!(BridgeRegistry::lookup::<WireNode>().is_none());
        assert!(!BridgeRegistry::is_bridgeable::<&'static str>());
    }

    #[test]
    fn test_integer_coercion() {
        let to_i32 = BridgeRegistry::lookup::<i32>().unwrap();

        assert_eq!(to_i32.coerce(&node(json!("42"))), Some(42));
        assert_eq!(to_i32.coerce(&node(json!(" -7 "))), Some(-7));
        assert_eq!(to_i32.coerce(&node(json!("3.0"))), Some(3));
        assert_eq!(to_i32.coerce(&node(json!(12))), Some(12));
        assert_eq!(to_i32.coerce(&node(json!(12.0))), Some(12));

        assert_eq!(to_i32.coerce(&node(json!("abc"))), None);
        assert_eq!(to_i32.coerce(&node(json!(1.5))), None);
        assert_eq!(to_i32.coerce(&node(json!("1.5"))), None);
        assert_eq!(to_i32.coerce(&node(json!(true))), None);
        assert_eq!(to_i32.coerce(&node(json!(null))), None);
        assert_eq!(to_i32.coerce(&node(json!([1]))), None);
        assert_eq!(to_i32.coerce(&node(json!({"a": 1}))), None);
    }

    #[test]
    fn test_integer_coercion_respects_width() {
        let to_u8 = BridgeRegistry::lookup::<u8>().unwrap();
        assert_eq!(to_u8.coerce(&node(json!("255"))), Some(255));
        assert_eq!(to_u8.coerce(&node(json!("256"))), None);
        assert_eq!(to_u8.coerce(&node(json!(-1))), None);

        let to_u64 = BridgeRegistry::lookup::<u64>().unwrap();
        assert_eq!(
            to_u64.coerce(&node(json!("18446744073709551615"))),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_float_coercion() {
        let to_f64 = BridgeRegistry::lookup::<f64>().unwrap();
        assert_eq!(to_f64.coerce(&node(json!("2.5"))), Some(2.5));
        assert_eq!(to_f64.coerce(&node(json!(3))), Some(3.0));
        assert_eq!(to_f64.coerce(&node(json!("NaN"))), None);
        assert_eq!(to_f64.coerce(&node(json!("inf"))), None);
        assert_eq!(to_f64.coerce(&node(json!(false))), None);

        let to_f32 = BridgeRegistry::lookup::<f32>().unwrap();
        assert_eq!(to_f32.coerce(&node(json!("0.5"))), Some(0.5));
    }

    #[test]
    fn test_bool_coercion() {
        let to_bool = BridgeRegistry::lookup::<bool>().unwrap();
        assert_eq!(to_bool.coerce(&node(json!(1))), Some(true));
        assert_eq!(to_bool.coerce(&node(json!(0))), Some(false));
        assert_eq!(to_bool.coerce(&node(json!("TRUE"))), Some(true));
        assert_eq!(to_bool.coerce(&node(json!("0"))), Some(false));
        assert_eq!(to_bool.coerce(&node(json!(2))), None);
        assert_eq!(to_bool.coerce(&node(json!("yes"))), None);
    }

    #[test]
    fn test_string_coercion() {
        let to_string = BridgeRegistry::lookup::<String>().unwrap();
        assert_eq!(to_string.coerce(&node(json!(42))), Some("42".to_string()));
        assert_eq!(to_string.coerce(&node(json!(1.25))), Some("1.25".to_string()));
        assert_eq!(to_string.coerce(&node(json!(false))), Some("false".to_string()));
        assert_eq!(to_string.coerce(&node(json!(null))), None);
        assert_eq!(to_string.coerce(&node(json!(["a"]))), None);
    }

    #[test]
    fn test_coerce_node_returns_canonical_form() {
        assert_eq!(
            BridgeType::I64.coerce_node(&node(json!("17"))),
            Some(WireNode::from(17i64))
        );
        assert_eq!(
            BridgeType::String.coerce_node(&node(json!(17))),
            Some(WireNode::from("17"))
        );
        assert_eq!(BridgeType::Bool.coerce_node(&node(json!({}))), None);
    }
}
