//! Roles and fixed-size per-role tables.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::ParseError;

/// A position on the map, plus the synthetic `Flex` role meaning "anything
/// not explicitly preferred".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Adc,
    Supp,
    Flex,
}

impl Role {
    /// The five canonical roles, in lane order.
    pub const LANES: [Role; 5] = [Role::Top, Role::Jungle, Role::Mid, Role::Adc, Role::Supp];

    /// Every role including `Flex`.
    pub const ALL: [Role; 6] = [
        Role::Top,
        Role::Jungle,
        Role::Mid,
        Role::Adc,
        Role::Supp,
        Role::Flex,
    ];

    /// Slot of this role in a [`RoleMap`]. Lanes occupy 0..5, `Flex` is 5.
    pub fn index(self) -> usize {
        match self {
            Role::Top => 0,
            Role::Jungle => 1,
            Role::Mid => 2,
            Role::Adc => 3,
            Role::Supp => 4,
            Role::Flex => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Top => "top",
            Role::Jungle => "jungle",
            Role::Mid => "mid",
            Role::Adc => "adc",
            Role::Supp => "supp",
            Role::Flex => "flex",
        }
    }

    pub fn is_flex(self) -> bool {
        matches!(self, Role::Flex)
    }

    /// Adc and support share the bot lane.
    pub fn is_bot(self) -> bool {
        matches!(self, Role::Adc | Role::Supp)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Role::Top),
            "jungle" | "jg" => Ok(Role::Jungle),
            "mid" | "middle" => Ok(Role::Mid),
            "adc" | "bot" | "bottom" => Ok(Role::Adc),
            "supp" | "support" | "utility" => Ok(Role::Supp),
            "flex" | "fill" => Ok(Role::Flex),
            _ => Err(ParseError::UnknownRole(s.to_string())),
        }
    }
}

/// A value for every role, `Flex` included, stored inline.
///
/// Serializes as a map keyed by role name. Deserialization tolerates missing
/// keys and fills them with `T::default()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleMap<T>([T; 6]);

impl<T> RoleMap<T> {
    pub fn from_fn(mut f: impl FnMut(Role) -> T) -> Self {
        Self(Role::ALL.map(&mut f))
    }

    /// Iterate the five lanes with their values, skipping `Flex`.
    pub fn lanes(&self) -> impl Iterator<Item = (Role, &T)> {
        Role::LANES.into_iter().map(move |role| (role, &self[role]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        Role::ALL.into_iter().map(move |role| (role, &self[role]))
    }
}

impl<T: Clone> RoleMap<T> {
    /// Every role, `Flex` included, set to `value`.
    pub fn filled(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T> Index<Role> for RoleMap<T> {
    type Output = T;

    fn index(&self, role: Role) -> &T {
        &self.0[role.index()]
    }
}

impl<T> IndexMut<Role> for RoleMap<T> {
    fn index_mut(&mut self, role: Role) -> &mut T {
        &mut self.0[role.index()]
    }
}

impl<T: Serialize> Serialize for RoleMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        for (role, value) in self.iter() {
            map.serialize_entry(role.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for RoleMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<Role, T>::deserialize(deserializer)?;
        let mut map = RoleMap::<T>::default();
        for (role, value) in entries {
            map[role] = value;
        }
        Ok(map)
    }
}

/// Serialize only the five lanes of a [`RoleMap`], for tables where `Flex`
/// carries no meaning (role chances, champion histograms).
pub fn serialize_lanes<T, S>(map: &RoleMap<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let mut out = serializer.serialize_map(Some(5))?;
    for (role, value) in map.lanes() {
        out.serialize_entry(role.as_str(), value)?;
    }
    out.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_aliases() {
        assert_eq!("top".parse::<Role>().unwrap(), Role::Top);
        assert_eq!("Support".parse::<Role>().unwrap(), Role::Supp);
        assert_eq!("middle".parse::<Role>().unwrap(), Role::Mid);
        assert_eq!("fill".parse::<Role>().unwrap(), Role::Flex);
        assert!(matches!(
            "carry".parse::<Role>(),
            Err(ParseError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_role_index_matches_order() {
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
        assert!(!Role::LANES.contains(&Role::Flex));
    }

    #[test]
    fn test_role_map_index() {
        let mut map = RoleMap::filled(0u32);
        map[Role::Mid] = 7;
        map[Role::Flex] = 3;
        assert_eq!(map[Role::Mid], 7);
        assert_eq!(map[Role::Flex], 3);
        assert_eq!(map.lanes().map(|(_, v)| *v).sum::<u32>(), 7);
    }

    #[test]
    fn test_role_map_serialization() {
        let map = RoleMap::from_fn(|role| role.index() as u32);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"flex\":5"));

        let parsed: RoleMap<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_role_map_missing_keys_default() {
        let parsed: RoleMap<u32> = serde_json::from_str(r#"{"adc": 40}"#).unwrap();
        assert_eq!(parsed[Role::Adc], 40);
        assert_eq!(parsed[Role::Top], 0);
        assert_eq!(parsed[Role::Flex], 0);
    }

    #[test]
    fn test_serialize_lanes_skips_flex() {
        #[derive(Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_lanes")]
            chances: RoleMap<u32>,
        }

        let json = serde_json::to_string(&Wrapper {
            chances: RoleMap::filled(20),
        })
        .unwrap();
        assert!(!json.contains("flex"));
        assert!(json.contains("\"supp\":20"));
    }
}
