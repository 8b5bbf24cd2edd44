//! Total medal comparison between the focus country, the aggregate group
//! and peer countries.

use serde::Serialize;

use super::AnalysisError;
use crate::models::MedalTable;

/// Role of an entity in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Focus,
    Group,
    Peer,
}

/// Total medals of one entity over all games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTotal {
    pub entity: String,
    pub kind: EntityKind,
    pub total: f64,
}

/// Entity totals in comparison order: focus, group, then peers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub entities: Vec<EntityTotal>,
    /// Entity with the highest total. Ties go to the earliest entity.
    pub leader: Option<String>,
}

impl Comparison {
    /// Entity with the highest total.
    ///
    /// When several entities share the maximum, the first one in
    /// comparison order wins; see [`Comparison::leaders`] for all of them.
    pub fn leader(&self) -> Option<&EntityTotal> {
        self.entities.iter().fold(None, |best, e| match best {
            Some(b) if b.total >= e.total => Some(b),
            _ => Some(e),
        })
    }

    /// Every entity sharing the maximum total, in comparison order.
    pub fn leaders(&self) -> Vec<&EntityTotal> {
        match self.leader() {
            Some(top) => self
                .entities
                .iter()
                .filter(|e| e.total == top.total)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Entities by total, highest first. Ties keep comparison order.
    pub fn sorted_desc(&self) -> Vec<&EntityTotal> {
        let mut sorted: Vec<&EntityTotal> = self.entities.iter().collect();
        sorted.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    /// Total for an entity by name.
    #[allow(dead_code)] // Lookup utility
    pub fn total_of(&self, entity: &str) -> Option<f64> {
        self.entities
            .iter()
            .find(|e| e.entity == entity)
            .map(|e| e.total)
    }

    /// First entity of a given kind.
    pub fn first_of(&self, kind: EntityKind) -> Option<&EntityTotal> {
        self.entities.iter().find(|e| e.kind == kind)
    }
}

/// Compute full-column totals for the focus country, the group and peers.
///
/// Duplicate names are dropped; the first occurrence keeps its role.
pub fn compare_totals(
    table: &MedalTable,
    focus: &str,
    group: &str,
    peers: &[String],
) -> Result<Comparison, AnalysisError> {
    let candidates = [(focus, EntityKind::Focus), (group, EntityKind::Group)]
        .into_iter()
        .chain(peers.iter().map(|p| (p.as_str(), EntityKind::Peer)));

    let mut entities: Vec<EntityTotal> = Vec::new();
    for (name, kind) in candidates {
        if entities.iter().any(|e| e.entity == name) {
            continue;
        }
        let total = table
            .column_total(name)
            .ok_or_else(|| AnalysisError::UnknownColumn(name.to_string()))?;
        entities.push(EntityTotal {
            entity: name.to_string(),
            kind,
            total,
        });
    }

    let mut comparison = Comparison {
        entities,
        leader: None,
    };
    comparison.leader = comparison.leader().map(|e| e.entity.clone());

    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{table, three_games};

    fn peers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn example_table() -> MedalTable {
        // Totals: PK=10, Group1=25, IND=50, IR=5
        table(
            &["PK", "IND", "IR", "Group1"],
            &[
                (0.02, &[4.0, 20.0, 5.0, 10.0]),
                (0.10, &[6.0, 30.0, 0.0, 15.0]),
            ],
        )
    }

    #[test]
    fn test_compare_totals() {
        let result = compare_totals(&example_table(), "PK", "Group1", &peers(&["IND", "IR"])).unwrap();

        assert_eq!(result.entities.len(), 4);
        assert_eq!(result.total_of("PK"), Some(10.0));
        assert_eq!(result.total_of("Group1"), Some(25.0));
        assert_eq!(result.total_of("IND"), Some(50.0));
        assert_eq!(result.total_of("IR"), Some(5.0));
        assert_eq!(result.leader.as_deref(), Some("IND"));
        assert_eq!(result.leader().map(|e| e.total), Some(50.0));
    }

    #[test]
    fn test_entity_kinds() {
        let result = compare_totals(&example_table(), "PK", "Group1", &peers(&["IND"])).unwrap();

        assert_eq!(result.first_of(EntityKind::Focus).map(|e| e.entity.as_str()), Some("PK"));
        assert_eq!(result.first_of(EntityKind::Group).map(|e| e.entity.as_str()), Some("Group1"));
        assert_eq!(result.first_of(EntityKind::Peer).map(|e| e.entity.as_str()), Some("IND"));
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let result =
            compare_totals(&example_table(), "PK", "Group1", &peers(&["PK", "IND", "IND"])).unwrap();

        let names: Vec<_> = result.entities.iter().map(|e| e.entity.as_str()).collect();
        assert_eq!(names, vec!["PK", "Group1", "IND"]);
        assert_eq!(result.entities[0].kind, EntityKind::Focus);
    }

    #[test]
    fn test_tie_goes_to_earliest_entity() {
        let data = table(&["PK", "IND", "Group1"], &[(0.02, &[4.0, 4.0, 1.0])]);

        let result = compare_totals(&data, "PK", "Group1", &peers(&["IND"])).unwrap();

        assert_eq!(result.leader.as_deref(), Some("PK"));
        let leaders: Vec<_> = result.leaders().iter().map(|e| e.entity.clone()).collect();
        assert_eq!(leaders, vec!["PK", "IND"]);
    }

    #[test]
    fn test_sorted_desc() {
        let result = compare_totals(&three_games(), "PK", "Group1", &peers(&["IND"])).unwrap();

        let sorted: Vec<_> = result
            .sorted_desc()
            .into_iter()
            .map(|e| (e.entity.as_str(), e.total))
            .collect();
        assert_eq!(sorted, vec![("Group1", 5.0), ("IND", 4.0), ("PK", 3.0)]);
    }

    #[test]
    fn test_unknown_peer() {
        let err = compare_totals(&three_games(), "PK", "Group1", &peers(&["USA"])).unwrap_err();
        assert_eq!(err, AnalysisError::UnknownColumn("USA".to_string()));
    }

    #[test]
    fn test_empty_table_has_zero_totals() {
        let data = table(&["PK", "Group1"], &[]);

        let result = compare_totals(&data, "PK", "Group1", &[]).unwrap();

        assert_eq!(result.total_of("PK"), Some(0.0));
        assert_eq!(result.leader.as_deref(), Some("PK"));
    }
}
