use serde_json::{Map, Value};

/// Dotted-path access into a JSON tree, e.g. `attributes.origins.0.header`.
///
/// Numeric segments index arrays; every other segment is an object key.
/// Writes preserve the position of existing keys.
pub trait PathAccess {
    fn get_path(&self, path: &str) -> Option<&Value>;
    fn get_path_mut(&mut self, path: &str) -> Option<&mut Value>;
    /// Sets the value at `path`, creating missing intermediate objects.
    /// Returns `false` when an intermediate value is not a container.
    fn set_path(&mut self, path: &str, value: Value) -> bool;
    fn delete_path(&mut self, path: &str) -> Option<Value>;
    /// Renames the last key of `path` to `new_key` without moving it.
    fn rename_path(&mut self, path: &str, new_key: &str) -> bool;

    fn exists(&self, path: &str) -> bool {
        self.get_path(path).is_some()
    }

    fn is_array_at(&self, path: &str) -> bool {
        matches!(self.get_path(path), Some(Value::Array(_)))
    }

    fn is_object_at(&self, path: &str) -> bool {
        matches!(self.get_path(path), Some(Value::Object(_)))
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => items.get_mut(index),
            Err(_) => None,
        },
        _ => None,
    }
}

fn split_last(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('.') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, path),
    }
}

impl PathAccess for Value {
    fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, child)
    }

    fn get_path_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut current = self;
        for segment in path.split('.') {
            current = child_mut(current, segment)?;
        }
        Some(current)
    }

    fn set_path(&mut self, path: &str, value: Value) -> bool {
        let mut current = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let last = segments.peek().is_none();
            match current {
                Value::Object(map) => {
                    if last {
                        map.insert(segment.to_string(), value);
                        return true;
                    }
                    current = map
                        .entry(segment.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                }
                Value::Array(items) => {
                    let Ok(index) = segment.parse::<usize>() else {
                        return false;
                    };
                    let Some(slot) = items.get_mut(index) else {
                        return false;
                    };
                    if last {
                        *slot = value;
                        return true;
                    }
                    current = slot;
                }
                _ => return false,
            }
        }
        false
    }

    fn delete_path(&mut self, path: &str) -> Option<Value> {
        let (parent, last) = split_last(path);
        let container = match parent {
            Some(parent) => self.get_path_mut(parent)?,
            None => self,
        };
        match container {
            Value::Object(map) => map.shift_remove(last),
            Value::Array(items) => {
                let index = last.parse::<usize>().ok()?;
                (index < items.len()).then(|| items.remove(index))
            }
            _ => None,
        }
    }

    fn rename_path(&mut self, path: &str, new_key: &str) -> bool {
        let (parent, last) = split_last(path);
        let container = match parent {
            Some(parent) => self.get_path_mut(parent),
            None => Some(self),
        };
        let Some(Value::Object(map)) = container else {
            return false;
        };
        if !map.contains_key(last) {
            return false;
        }
        if last == new_key {
            return true;
        }

        let entries = std::mem::take(map);
        for (key, value) in entries {
            if key == new_key {
                continue;
            }
            if key == last {
                map.insert(new_key.to_string(), value);
            } else {
                map.insert(key, value);
            }
        }
        true
    }
}
