use crate::entity::Entity;

/// Case-insensitive substring match on the display name.
pub fn matches<E: Entity>(entity: &E, query: &str) -> bool {
    query.is_empty() || entity.name().to_lowercase().contains(&query.to_lowercase())
}

/// Entities whose name contains `query`, in collection order.
///
/// An empty query keeps the whole collection.
pub fn filter<'a, E: Entity>(collection: &'a [E], query: &str) -> Vec<&'a E> {
    let needle = query.to_lowercase();
    collection
        .iter()
        .filter(|e| needle.is_empty() || e.name().to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    fn categories(names: &[&str]) -> Vec<Category> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Category {
                id: i as u64 + 1,
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn empty_query_returns_everything() {
        let all = categories(&["Rifles", "Pistols", "Knives"]);
        let visible = filter(&all, "");
        assert_eq!(visible.len(), 3);
        assert!(visible.iter().zip(&all).all(|(a, b)| *a == b));
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        let all = categories(&["Rifles", "Sniper Rifles", "Pistols", "SMG"]);
        let names: Vec<_> = filter(&all, "RIF").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rifles", "Sniper Rifles"]);

        let names: Vec<_> = filter(&all, "r r").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Sniper Rifles"]);

        // Words must appear in order, as one substring.
        assert!(filter(&all, "rifles s").is_empty());
        assert!(!matches(&all[1], "rifles s"));
    }

    #[test]
    fn no_match_is_empty() {
        let all = categories(&["Rifles"]);
        assert!(filter(&all, "shotgun").is_empty());
        assert!(!matches(&all[0], "shotgun"));
        assert!(matches(&all[0], "FLE"));
    }

    #[test]
    fn non_ascii_names() {
        let all = categories(&["Ножи", "Пистолеты"]);
        let names: Vec<_> = filter(&all, "нож").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ножи"]);
    }
}
