//! Property-based tests for names and the tree.
//!
//! Components are drawn from an alphabet that is dense in delimiters and
//! escape characters, so the escaping rules get exercised in every position.

use crate::contract::Invariant;
use crate::{ESCAPE_CHARACTER, Name, Tree, split_data_string};
use proptest::prelude::*;

fn delimiter_strategy() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['.', '/', '#', ':', ' ', 'x'])
}

fn component_strategy() -> impl Strategy<Value = String> {
    r"[a-c./#:\\ x]{1,8}"
}

fn components_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(component_strategy(), 0..6)
}

fn name_strategy() -> impl Strategy<Value = Name> {
    (components_strategy(), delimiter_strategy())
        .prop_map(|(components, delimiter)| Name::new(components, delimiter).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // as_string(d) is a plain join
    #[test]
    fn as_string_joins_components(components in components_strategy(), d in delimiter_strategy()) {
        let name = Name::new(components.clone(), d).unwrap();
        prop_assert_eq!(name.as_string_with(d), components.join(d.to_string().as_str()));
    }

    // Parsing the data string restores the exact components
    #[test]
    fn data_string_round_trips(name in name_strategy()) {
        let data = name.as_data_string();
        let parts = split_data_string(&data, name.delimiter()).unwrap();
        prop_assert_eq!(&parts[..], name.components());
        prop_assert_eq!(Name::parse(&data, name.delimiter()).unwrap(), name);
    }

    // insert(i, c).remove(i) == name
    #[test]
    fn insert_then_remove_is_identity(name in name_strategy(), c in component_strategy(), pick in any::<prop::sample::Index>()) {
        let i = pick.index(name.no_components() + 1);
        let restored = name.insert(i, c).unwrap().remove(i).unwrap();
        prop_assert!(restored.is_equal(&name));
    }

    // Equal names have equal hash codes
    #[test]
    fn equal_names_hash_equally(components in components_strategy(), d in delimiter_strategy()) {
        let a = Name::new(components.clone(), d).unwrap();
        let b = Name::parse(&a.as_data_string(), d).unwrap();
        prop_assert!(a.is_equal(&b) && b.is_equal(&a));
        prop_assert_eq!(a.hash_code(), b.hash_code());
    }

    // Every derived name keeps its invariants
    #[test]
    fn derived_names_keep_invariants(name in name_strategy(), c in component_strategy()) {
        prop_assert!(name.append(c.clone()).unwrap().check_invariants().is_ok());
        prop_assert!(name.concat(&name).unwrap().check_invariants().is_ok());
        if !name.is_empty() {
            prop_assert!(name.set_component(0, c).unwrap().check_invariants().is_ok());
        }
    }

    // The escape character is never accepted as a delimiter
    #[test]
    fn escape_character_never_delimits(components in components_strategy()) {
        prop_assert!(Name::new(components, ESCAPE_CHARACTER).is_err());
    }

    // A node k levels deep has a k-component full name
    #[test]
    fn full_name_depth_matches(path in prop::collection::vec("[a-z]{1,6}", 1..8)) {
        let mut tree = Tree::new();
        let mut dir = tree.root();
        for part in &path[..path.len() - 1] {
            dir = tree.create_directory(part.as_str(), dir).unwrap();
        }
        let leaf = tree.create_file(path[path.len() - 1].as_str(), dir).unwrap();

        let full = tree.full_name(leaf).unwrap();
        prop_assert_eq!(full.components(), &path[..]);
        prop_assert!(tree.check_invariants().is_ok());
    }
}
