//! Bounded serialization engine.
//!
//! A serde `Serializer` that builds a `serde_json::Value` while enforcing the
//! settings: containers nested deeper than `max_depth` become
//! [`TRUNCATED`], struct fields listed in the ignores are skipped before their
//! value is visited, and members that point back at a value still being
//! serialized are handled per [`CycleHandling`].
//!
//! Depth counts containers: the root container is level 1. Externally tagged
//! enum wrappers do not add a level.

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::SerializeError;
use crate::serialization::settings::{CycleHandling, SerializerSettings};

/// Placeholder for containers beyond the depth limit.
pub const TRUNCATED: &str = "<truncated>";

/// Hard limit on the number of members on the descent path. Only reachable
/// with `CycleHandling::Serialize` on a cycle that opens no container.
const MAX_PATH_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Identity {
    addr: usize,
    type_name: &'static str,
}

impl Identity {
    fn of<T: ?Sized>(value: &T) -> Self {
        Self {
            addr: value as *const T as *const () as usize,
            type_name: std::any::type_name::<T>(),
        }
    }
}

struct WalkState<'s> {
    settings: &'s SerializerSettings,
    path: Vec<Identity>,
}

impl<'s> WalkState<'s> {
    fn new(settings: &'s SerializerSettings) -> Self {
        Self {
            settings,
            path: Vec::new(),
        }
    }

    /// Serialize a member at `depth`. `Ok(None)` means the member must be
    /// omitted.
    fn visit<T: ?Sized + Serialize>(
        &mut self,
        member: &str,
        value: &T,
        depth: usize,
    ) -> Result<Option<Value>, SerializeError> {
        let identity = Identity::of(value);
        if self.path.contains(&identity) {
            match self.settings.cycle_handling {
                CycleHandling::Ignore => return Ok(None),
                CycleHandling::Error => {
                    return Err(SerializeError::SelfReferencingLoop {
                        member: member.to_string(),
                        type_name: identity.type_name,
                    })
                }
                CycleHandling::Serialize => {}
            }
        }
        if self.path.len() >= MAX_PATH_LEN {
            return Err(SerializeError::Custom(format!(
                "member path exceeds {} entries at `{}`",
                MAX_PATH_LEN, member
            )));
        }

        self.path.push(identity);
        let result = value.serialize(Walker {
            state: &mut *self,
            depth,
        });
        self.path.pop();
        result.map(Some)
    }

    fn opens_past_limit(&self, depth: usize) -> bool {
        depth + 1 > self.settings.max_depth
    }
}

/// Serialize `value` into a generic tree under `settings`.
pub fn to_tree<T: ?Sized + Serialize>(
    value: &T,
    settings: &SerializerSettings,
) -> Result<Value, SerializeError> {
    let mut state = WalkState::new(settings);
    Ok(state.visit("$", value, 0)?.unwrap_or(Value::Null))
}

/// Serialize `value` to compact JSON text under `settings`.
pub fn serialize_with<T: ?Sized + Serialize>(
    value: &T,
    settings: &SerializerSettings,
) -> Result<String, SerializeError> {
    let tree = to_tree(value, settings)?;
    Ok(serde_json::to_string(&tree)?)
}

/// Parse JSON text into a generic tree.
pub fn deserialize(text: &str) -> Result<Value, SerializeError> {
    Ok(serde_json::from_str(text)?)
}

struct Walker<'a, 's> {
    state: &'a mut WalkState<'s>,
    depth: usize,
}

fn wrap_variant(variant: &'static str, inner: Value) -> Value {
    let mut map = Map::new();
    map.insert(variant.to_string(), inner);
    Value::Object(map)
}

impl<'a, 's> ser::Serializer for Walker<'a, 's> {
    type Ok = Value;
    type Error = SerializeError;

    type SerializeSeq = SeqWalker<'a, 's>;
    type SerializeTuple = SeqWalker<'a, 's>;
    type SerializeTupleStruct = SeqWalker<'a, 's>;
    type SerializeTupleVariant = SeqWalker<'a, 's>;
    type SerializeMap = MapWalker<'a, 's>;
    type SerializeStruct = StructWalker<'a, 's>;
    type SerializeStructVariant = StructWalker<'a, 's>;

    fn serialize_bool(self, v: bool) -> Result<Value, SerializeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, SerializeError> {
        Ok(match i64::try_from(v) {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(v.to_string()),
        })
    }

    fn serialize_u8(self, v: u8) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, SerializeError> {
        Ok(match u64::try_from(v) {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(v.to_string()),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Value, SerializeError> {
        // Shortest f32 form, not the widened binary value.
        let widened = v.to_string().parse::<f64>().unwrap_or(f64::from(v));
        self.serialize_f64(widened)
    }

    fn serialize_f64(self, v: f64) -> Result<Value, SerializeError> {
        // NaN and infinities have no JSON form.
        Ok(Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null))
    }

    fn serialize_char(self, v: char) -> Result<Value, SerializeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, SerializeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, SerializeError> {
        if self.state.opens_past_limit(self.depth) {
            return Ok(Value::String(TRUNCATED.to_string()));
        }
        Ok(Value::Array(
            v.iter().map(|b| Value::Number((*b).into())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, SerializeError> {
        Ok(self
            .state
            .visit("Some", value, self.depth)?
            .unwrap_or(Value::Null))
    }

    fn serialize_unit(self) -> Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, SerializeError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value, SerializeError> {
        Ok(self
            .state
            .visit(name, value, self.depth)?
            .unwrap_or(Value::Null))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, SerializeError> {
        let inner = self
            .state
            .visit(variant, value, self.depth)?
            .unwrap_or(Value::Null);
        Ok(wrap_variant(variant, inner))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqWalker<'a, 's>, SerializeError> {
        Ok(SeqWalker::new(self, len, None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqWalker<'a, 's>, SerializeError> {
        Ok(SeqWalker::new(self, Some(len), None))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqWalker<'a, 's>, SerializeError> {
        Ok(SeqWalker::new(self, Some(len), None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqWalker<'a, 's>, SerializeError> {
        Ok(SeqWalker::new(self, Some(len), Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapWalker<'a, 's>, SerializeError> {
        let truncated = self.state.opens_past_limit(self.depth);
        Ok(MapWalker {
            level: self.depth + 1,
            state: self.state,
            map: Map::new(),
            next_key: None,
            truncated,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<StructWalker<'a, 's>, SerializeError> {
        Ok(StructWalker::new(self, name, None))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructWalker<'a, 's>, SerializeError> {
        Ok(StructWalker::new(self, name, Some(variant)))
    }
}

struct SeqWalker<'a, 's> {
    state: &'a mut WalkState<'s>,
    level: usize,
    items: Vec<Value>,
    truncated: bool,
    variant: Option<&'static str>,
}

impl<'a, 's> SeqWalker<'a, 's> {
    fn new(walker: Walker<'a, 's>, len: Option<usize>, variant: Option<&'static str>) -> Self {
        let truncated = walker.state.opens_past_limit(walker.depth);
        let capacity = if truncated { 0 } else { len.unwrap_or(0) };
        Self {
            level: walker.depth + 1,
            state: walker.state,
            items: Vec::with_capacity(capacity),
            truncated,
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        if self.truncated {
            return Ok(());
        }
        let member = format!("[{}]", self.items.len());
        if let Some(item) = self.state.visit(&member, value, self.level)? {
            self.items.push(item);
        }
        Ok(())
    }

    fn finish(self) -> Value {
        let value = if self.truncated {
            Value::String(TRUNCATED.to_string())
        } else {
            Value::Array(self.items)
        };
        match self.variant {
            Some(variant) => wrap_variant(variant, value),
            None => value,
        }
    }
}

impl ser::SerializeSeq for SeqWalker<'_, '_> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqWalker<'_, '_> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqWalker<'_, '_> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqWalker<'_, '_> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(self.finish())
    }
}

struct MapWalker<'a, 's> {
    state: &'a mut WalkState<'s>,
    level: usize,
    map: Map<String, Value>,
    next_key: Option<String>,
    truncated: bool,
}

impl ser::SerializeMap for MapWalker<'_, '_> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), SerializeError> {
        if self.truncated {
            return Ok(());
        }
        let key = key.serialize(Walker {
            state: &mut *self.state,
            depth: self.level,
        })?;
        self.next_key = Some(match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return Err(SerializeError::KeyMustBeString),
        });
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        if self.truncated {
            return Ok(());
        }
        let key = self
            .next_key
            .take()
            .ok_or_else(|| SerializeError::Custom("map value without a key".to_string()))?;
        if let Some(value) = self.state.visit(&key, value, self.level)? {
            self.map.insert(key, value);
        }
        Ok(())
    }

    fn end(self) -> Result<Value, SerializeError> {
        if self.truncated {
            return Ok(Value::String(TRUNCATED.to_string()));
        }
        Ok(Value::Object(self.map))
    }
}

struct StructWalker<'a, 's> {
    state: &'a mut WalkState<'s>,
    level: usize,
    type_name: &'static str,
    map: Map<String, Value>,
    truncated: bool,
    variant: Option<&'static str>,
}

impl<'a, 's> StructWalker<'a, 's> {
    fn new(walker: Walker<'a, 's>, type_name: &'static str, variant: Option<&'static str>) -> Self {
        let truncated = walker.state.opens_past_limit(walker.depth);
        Self {
            level: walker.depth + 1,
            state: walker.state,
            type_name,
            map: Map::new(),
            truncated,
            variant,
        }
    }

    fn field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        if self.truncated || self.state.settings.ignores.is_ignored(self.type_name, key) {
            return Ok(());
        }
        if let Some(value) = self.state.visit(key, value, self.level)? {
            self.map.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn finish(self) -> Value {
        let value = if self.truncated {
            Value::String(TRUNCATED.to_string())
        } else {
            Value::Object(self.map)
        };
        match self.variant {
            Some(variant) => wrap_variant(variant, value),
            None => value,
        }
    }
}

impl ser::SerializeStruct for StructWalker<'_, '_> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        self.field(key, value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for StructWalker<'_, '_> {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        self.field(key, value)
    }

    fn end(self) -> Result<Value, SerializeError> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    #[derive(Serialize)]
    struct Leaf {
        id: u32,
    }

    #[derive(Serialize)]
    struct Middle {
        name: &'static str,
        leaf: Leaf,
    }

    #[derive(Serialize)]
    struct Top {
        level: u8,
        middle: Middle,
    }

    #[derive(Serialize)]
    struct Node {
        name: String,
        next: RefCell<Option<Rc<Node>>>,
    }

    #[test]
    fn test_scalars() {
        let settings = SerializerSettings::default();
        assert_eq!(to_tree(&5i32, &settings).unwrap(), json!(5));
        assert_eq!(to_tree(&true, &settings).unwrap(), json!(true));
        assert_eq!(to_tree(&f64::NAN, &settings).unwrap(), Value::Null);
        assert_eq!(to_tree(&u128::MAX, &settings).unwrap(), json!(u128::MAX.to_string()));
        assert_eq!(to_tree(&Option::<u8>::None, &settings).unwrap(), Value::Null);
    }

    #[test]
    fn test_f32_keeps_shortest_form() {
        let settings = SerializerSettings::default();
        assert_eq!(to_tree(&0.1f32, &settings).unwrap(), json!(0.1));
        assert_eq!(to_tree(&[1.5f32, 0.3f32], &settings).unwrap(), json!([1.5, 0.3]));
        assert_eq!(to_tree(&f32::INFINITY, &settings).unwrap(), Value::Null);
    }

    #[test]
    fn test_depth_two_truncates_third_level() {
        let top = Top {
            level: 1,
            middle: Middle {
                name: "m",
                leaf: Leaf { id: 7 },
            },
        };
        let tree = to_tree(&top, &SerializerSettings::default()).unwrap();
        assert_eq!(
            tree,
            json!({"level": 1, "middle": {"name": "m", "leaf": TRUNCATED}})
        );
    }

    #[test]
    fn test_depth_limit_is_configurable() {
        let top = Top {
            level: 1,
            middle: Middle {
                name: "m",
                leaf: Leaf { id: 7 },
            },
        };
        let settings = SerializerSettings::default().with_max_depth(3);
        let tree = to_tree(&top, &settings).unwrap();
        assert_eq!(tree["middle"]["leaf"]["id"], json!(7));

        let flat = to_tree(&top, &SerializerSettings::default().with_max_depth(0)).unwrap();
        assert_eq!(flat, json!(TRUNCATED));
    }

    #[test]
    fn test_nested_sequences() {
        let nested = vec![vec![vec![1, 2], vec![3]], vec![]];
        let tree = to_tree(&nested, &SerializerSettings::default()).unwrap();
        assert_eq!(tree, json!([[TRUNCATED, TRUNCATED], []]));
    }

    #[test]
    fn test_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(1u32, "one");
        map.insert(2u32, "two");
        let tree = to_tree(&map, &SerializerSettings::default()).unwrap();
        assert_eq!(tree, json!({"1": "one", "2": "two"}));

        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], 1);
        assert!(matches!(
            to_tree(&bad, &SerializerSettings::default()),
            Err(SerializeError::KeyMustBeString)
        ));
    }

    #[test]
    fn test_ignored_field_is_skipped() {
        let middle = Middle {
            name: "m",
            leaf: Leaf { id: 7 },
        };
        let settings = SerializerSettings::default().ignore("Middle", "leaf");
        let tree = to_tree(&middle, &settings).unwrap();
        assert_eq!(tree, json!({"name": "m"}));
    }

    #[test]
    fn test_enum_variants() {
        #[derive(Serialize)]
        enum Shape {
            Unit,
            Circle(f64),
            Rect { w: u32, h: u32 },
            Pair(u8, u8),
        }
        let settings = SerializerSettings::default();
        assert_eq!(to_tree(&Shape::Unit, &settings).unwrap(), json!("Unit"));
        assert_eq!(to_tree(&Shape::Circle(1.5), &settings).unwrap(), json!({"Circle": 1.5}));
        assert_eq!(
            to_tree(&Shape::Rect { w: 2, h: 3 }, &settings).unwrap(),
            json!({"Rect": {"w": 2, "h": 3}})
        );
        assert_eq!(to_tree(&Shape::Pair(1, 2), &settings).unwrap(), json!({"Pair": [1, 2]}));
    }

    fn self_loop() -> Rc<Node> {
        let node = Rc::new(Node {
            name: "a".to_string(),
            next: RefCell::new(None),
        });
        *node.next.borrow_mut() = Some(node.clone());
        node
    }

    fn break_loop(node: &Rc<Node>) {
        node.next.borrow_mut().take();
    }

    #[test]
    fn test_cycle_ignored() {
        let node = self_loop();
        let settings = SerializerSettings::default().with_max_depth(10);
        let tree = to_tree(&node, &settings).unwrap();
        assert_eq!(tree, json!({"name": "a", "next": {"name": "a"}}));
        break_loop(&node);
    }

    #[test]
    fn test_cycle_error() {
        let node = self_loop();
        let settings = SerializerSettings::default().with_cycle_handling(CycleHandling::Error);
        let result = to_tree(&node, &settings);
        assert!(matches!(
            result,
            Err(SerializeError::SelfReferencingLoop { .. })
        ));
        break_loop(&node);
    }

    #[test]
    fn test_cycle_serialize_bounded_by_depth() {
        let node = self_loop();
        let settings = SerializerSettings::default().with_cycle_handling(CycleHandling::Serialize);
        let tree = to_tree(&node, &settings).unwrap();
        assert_eq!(tree, json!({"name": "a", "next": {"name": "a", "next": TRUNCATED}}));
        break_loop(&node);
    }

    #[test]
    fn test_shared_siblings_are_not_cycles() {
        let shared = Rc::new(Leaf { id: 1 });
        let pair = vec![shared.clone(), shared];
        let tree = to_tree(&pair, &SerializerSettings::default()).unwrap();
        assert_eq!(tree, json!([{"id": 1}, {"id": 1}]));
    }

    #[test]
    fn test_serialize_with_and_deserialize() {
        let text = serialize_with(&Leaf { id: 3 }, &SerializerSettings::default()).unwrap();
        assert_eq!(text, r#"{"id":3}"#);
        assert_eq!(deserialize(&text).unwrap(), json!({"id": 3}));
        assert!(deserialize("{broken").is_err());
    }
}
