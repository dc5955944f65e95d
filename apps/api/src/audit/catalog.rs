use crate::audit::models::{Talent, TalentCategory, DEFAULT_TALENT_LEVEL};

/// Number of talents a user must pick for a complete signature.
pub const SIGNATURE_SIZE: usize = 5;

const TALENT_CATALOG: &[(&str, &str, TalentCategory)] = &[
    ("critical-thinking", "Critical thinking", TalentCategory::Analytical),
    ("synthesis", "Synthesis", TalentCategory::Analytical),
    ("problem-solving", "Complex problem solving", TalentCategory::Analytical),
    ("strategic-vision", "Strategic vision", TalentCategory::Analytical),
    ("empathy", "Empathy", TalentCategory::Relational),
    ("negotiation", "Negotiation", TalentCategory::Relational),
    ("leadership", "Leadership", TalentCategory::Relational),
    ("communication", "Communication", TalentCategory::Relational),
    ("creativity", "Creativity", TalentCategory::Creative),
    ("storytelling", "Storytelling", TalentCategory::Creative),
    ("design-thinking", "Design thinking", TalentCategory::Creative),
    ("innovation", "Innovation", TalentCategory::Creative),
    ("organization", "Organization", TalentCategory::Operational),
    ("adaptability", "Adaptability", TalentCategory::Operational),
    ("project-management", "Project management", TalentCategory::Operational),
    ("decision-making", "Decision making", TalentCategory::Operational),
    ("data-literacy", "Data literacy", TalentCategory::Technical),
    ("digital-tools", "Digital tools mastery", TalentCategory::Technical),
    ("technical-expertise", "Technical expertise", TalentCategory::Technical),
    ("ai-collaboration", "AI collaboration", TalentCategory::Technical),
];

/// Builds the talent list in its initial state: nothing selected, default level.
pub fn initial_talents() -> Vec<Talent> {
    TALENT_CATALOG
        .iter()
        .map(|(id, name, category)| Talent {
            id: (*id).to_string(),
            name: (*name).to_string(),
            category: *category,
            level: DEFAULT_TALENT_LEVEL,
            selected: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_unique() {
        let ids: HashSet<_> = TALENT_CATALOG.iter().map(|(id, _, _)| *id).collect();
        assert_eq!(ids.len(), TALENT_CATALOG.len());
    }

    #[test]
    fn test_catalog_covers_every_category() {
        let categories: HashSet<_> = TALENT_CATALOG.iter().map(|(_, _, c)| *c).collect();
        assert_eq!(categories.len(), 5);
    }

    #[test]
    fn test_initial_talents_unselected() {
        let talents = initial_talents();
        assert_eq!(talents.len(), 20);
        assert!(talents.iter().all(|t| !t.selected));
        assert!(talents.iter().all(|t| t.level == DEFAULT_TALENT_LEVEL));
    }
}
