// Button bindings: one logical action mapped onto one physical source

use super::InputError;
use serde::{Deserialize, Serialize};

/// Physical source of a binding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceRef {
    /// Keyboard key, DOM key code
    Key(u32),
    /// Gamepad button index
    Button(usize),
    /// Positive half of a gamepad axis
    AxisPositive(usize),
    /// Negative half of a gamepad axis
    AxisNegative(usize),
    /// Any of several gamepad buttons
    Buttons(Vec<usize>),
    /// Fires whenever the source of one of the named sibling bindings fires
    Alias(Vec<String>),
}

/// A single physical input observed by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalInput {
    Key(u32),
    Button(usize),
}

impl SourceRef {
    /// Whether this source can be remapped directly
    pub fn is_direct(&self) -> bool {
        !matches!(self, SourceRef::Alias(_) | SourceRef::Buttons(_))
    }

    /// Whether this source reacts to `input` without alias indirection
    pub fn matches(&self, input: PhysicalInput) -> bool {
        match (self, input) {
            (SourceRef::Key(code), PhysicalInput::Key(k)) => *code == k,
            (SourceRef::Button(index), PhysicalInput::Button(i)) => *index == i,
            (SourceRef::Buttons(indices), PhysicalInput::Button(i)) => indices.contains(&i),
            _ => false,
        }
    }

    /// Axis index and polarity for axis sources
    pub fn axis(&self) -> Option<(usize, f32)> {
        match self {
            SourceRef::AxisPositive(index) => Some((*index, 1.0)),
            SourceRef::AxisNegative(index) => Some((*index, -1.0)),
            _ => None,
        }
    }
}

/// Maps one logical action name onto one physical source
///
/// `Clone` always produces an unselected copy.
#[derive(Debug, PartialEq)]
pub struct ButtonBinding {
    pub name: String,
    pub source: SourceRef,
    /// Value reported on `down`; sign gives the polarity
    pub multiplier: f32,
    /// Marked while this binding is the remap capture target
    pub selected: bool,
}

impl ButtonBinding {
    pub fn new(name: impl Into<String>, source: SourceRef, multiplier: f32) -> Self {
        Self {
            name: name.into(),
            source,
            multiplier,
            selected: false,
        }
    }

    pub fn key(name: impl Into<String>, code: u32, multiplier: f32) -> Self {
        Self::new(name, SourceRef::Key(code), multiplier)
    }

    pub fn button(name: impl Into<String>, index: usize, multiplier: f32) -> Self {
        Self::new(name, SourceRef::Button(index), multiplier)
    }

    pub fn axis_positive(name: impl Into<String>, index: usize, multiplier: f32) -> Self {
        Self::new(name, SourceRef::AxisPositive(index), multiplier)
    }

    pub fn axis_negative(name: impl Into<String>, index: usize, multiplier: f32) -> Self {
        Self::new(name, SourceRef::AxisNegative(index), multiplier)
    }

    pub fn buttons(name: impl Into<String>, indices: Vec<usize>, multiplier: f32) -> Self {
        Self::new(name, SourceRef::Buttons(indices), multiplier)
    }

    pub fn alias<S: Into<String>>(
        name: impl Into<String>,
        targets: impl IntoIterator<Item = S>,
        multiplier: f32,
    ) -> Self {
        let targets = targets.into_iter().map(Into::into).collect();
        Self::new(name, SourceRef::Alias(targets), multiplier)
    }
}

impl Clone for ButtonBinding {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            source: self.source.clone(),
            multiplier: self.multiplier,
            selected: false,
        }
    }
}

/// Source kind tag of the stored format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Key,
    Button,
    AxisPositive,
    AxisNegative,
    Alias,
}

/// Stored `id` field: a single code/index or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredId {
    Scalar(u64),
    Indices(Vec<u64>),
    Names(Vec<String>),
}

/// Stored form of a binding: `{name, id, type, multiplier}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBinding {
    pub name: String,
    pub id: StoredId,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default = "default_multiplier")]
    pub multiplier: f32,
}

fn default_multiplier() -> f32 {
    1.0
}

impl From<&ButtonBinding> for StoredBinding {
    fn from(binding: &ButtonBinding) -> Self {
        let (id, kind) = match &binding.source {
            SourceRef::Key(code) => (StoredId::Scalar(u64::from(*code)), SourceKind::Key),
            SourceRef::Button(index) => (StoredId::Scalar(*index as u64), SourceKind::Button),
            SourceRef::AxisPositive(index) => {
                (StoredId::Scalar(*index as u64), SourceKind::AxisPositive)
            }
            SourceRef::AxisNegative(index) => {
                (StoredId::Scalar(*index as u64), SourceKind::AxisNegative)
            }
            SourceRef::Buttons(indices) => (
                StoredId::Indices(indices.iter().map(|i| *i as u64).collect()),
                SourceKind::Button,
            ),
            SourceRef::Alias(names) => (StoredId::Names(names.clone()), SourceKind::Alias),
        };
        Self {
            name: binding.name.clone(),
            id,
            kind,
            multiplier: binding.multiplier,
        }
    }
}

impl TryFrom<StoredBinding> for ButtonBinding {
    type Error = InputError;

    fn try_from(stored: StoredBinding) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| InputError::InvalidBinding {
            name: stored.name.clone(),
            reason: reason.to_string(),
        };
        let index = |value: u64| usize::try_from(value).map_err(|_| invalid("index out of range"));

        let source = match (&stored.id, stored.kind) {
            // Name lists are aliases whatever the tag says
            (StoredId::Names(names), _) => SourceRef::Alias(names.clone()),
            (StoredId::Scalar(code), SourceKind::Key) => {
                SourceRef::Key(u32::try_from(*code).map_err(|_| invalid("key code out of range"))?)
            }
            (StoredId::Scalar(i), SourceKind::Button) => SourceRef::Button(index(*i)?),
            (StoredId::Scalar(i), SourceKind::AxisPositive) => SourceRef::AxisPositive(index(*i)?),
            (StoredId::Scalar(i), SourceKind::AxisNegative) => SourceRef::AxisNegative(index(*i)?),
            (StoredId::Indices(list), SourceKind::Button) => SourceRef::Buttons(
                list.iter()
                    .map(|i| index(*i))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            // An empty JSON list deserializes as `Indices`
            (StoredId::Indices(list), SourceKind::Alias) if list.is_empty() => {
                SourceRef::Alias(Vec::new())
            }
            _ => return Err(invalid("id does not fit the binding type")),
        };

        if !stored.multiplier.is_finite() {
            return Err(invalid("multiplier is not finite"));
        }

        Ok(ButtonBinding::new(stored.name, source, stored.multiplier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(binding: &ButtonBinding) -> ButtonBinding {
        let json = serde_json::to_string(&StoredBinding::from(binding)).unwrap();
        let stored: StoredBinding = serde_json::from_str(&json).unwrap();
        ButtonBinding::try_from(stored).unwrap()
    }

    #[test]
    fn test_clone_clears_selection() {
        let mut binding = ButtonBinding::key("A", 70, 1.0);
        binding.selected = true;
        let copy = binding.clone();
        assert!(!copy.selected);
        assert_eq!(copy.name, "A");
        assert_eq!(copy.source, SourceRef::Key(70));
    }

    #[test]
    fn test_source_matches() {
        assert!(SourceRef::Key(13).matches(PhysicalInput::Key(13)));
        assert!(!SourceRef::Key(13).matches(PhysicalInput::Button(13)));
        assert!(SourceRef::Button(2).matches(PhysicalInput::Button(2)));
        assert!(SourceRef::Buttons(vec![0, 1, 2]).matches(PhysicalInput::Button(1)));
        assert!(!SourceRef::Buttons(vec![0, 1, 2]).matches(PhysicalInput::Button(9)));
        assert!(!SourceRef::Alias(vec!["A".into()]).matches(PhysicalInput::Key(70)));
    }

    #[test]
    fn test_axis_polarity() {
        assert_eq!(SourceRef::AxisPositive(3).axis(), Some((3, 1.0)));
        assert_eq!(SourceRef::AxisNegative(1).axis(), Some((1, -1.0)));
        assert_eq!(SourceRef::Button(1).axis(), None);
    }

    #[test]
    fn test_is_direct() {
        assert!(SourceRef::Key(1).is_direct());
        assert!(SourceRef::AxisNegative(0).is_direct());
        assert!(!SourceRef::Buttons(vec![0]).is_direct());
        assert!(!SourceRef::Alias(vec![]).is_direct());
    }

    #[test]
    fn test_stored_layout() {
        let json = serde_json::to_value(StoredBinding::from(&ButtonBinding::axis_negative(
            "UP", 1, 1.0,
        )))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "UP", "id": 1, "type": "AXIS_NEGATIVE", "multiplier": 1.0})
        );

        let json = serde_json::to_value(StoredBinding::from(&ButtonBinding::alias(
            "ACCEPT",
            ["A", "B"],
            1.0,
        )))
        .unwrap();
        assert_eq!(json["id"], serde_json::json!(["A", "B"]));
        assert_eq!(json["type"], "ALIAS");
    }

    #[test]
    fn test_round_trip_preserves_binding() {
        let mut selected = ButtonBinding::button("PAUSE", 9, 1.0);
        selected.selected = true;

        for binding in [
            ButtonBinding::key("LEFT", 37, -1.0),
            selected,
            ButtonBinding::axis_positive("RIGHT", 0, 1.0),
            ButtonBinding::buttons("ACCEPT", vec![0, 1, 2, 3], 1.0),
            ButtonBinding::alias("ACCEPT", ["A", "B"], 1.0),
        ] {
            let back = round_trip(&binding);
            assert_eq!(back.name, binding.name);
            assert_eq!(back.source, binding.source);
            assert_eq!(back.multiplier, binding.multiplier);
            assert!(!back.selected);
        }
    }

    #[test]
    fn test_legacy_key_alias_is_read_as_alias() {
        let stored: StoredBinding =
            serde_json::from_str(r#"{"name":"ACCEPT","id":["A","B"],"type":"KEY","multiplier":1}"#)
                .unwrap();
        let binding = ButtonBinding::try_from(stored).unwrap();
        assert_eq!(
            binding.source,
            SourceRef::Alias(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_mismatched_id_is_rejected() {
        let stored: StoredBinding =
            serde_json::from_str(r#"{"name":"UP","id":[1,2],"type":"AXIS_NEGATIVE","multiplier":1}"#)
                .unwrap();
        assert!(matches!(
            ButtonBinding::try_from(stored),
            Err(InputError::InvalidBinding { .. })
        ));
    }

    #[test]
    fn test_missing_multiplier_defaults_to_one() {
        let stored: StoredBinding =
            serde_json::from_str(r#"{"name":"A","id":70,"type":"KEY"}"#).unwrap();
        assert_eq!(stored.multiplier, 1.0);
    }
}
