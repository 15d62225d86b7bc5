//! Form pre-fill and completion of submissions.

use std::collections::BTreeMap;

use crate::category::{Category, FieldDefault, FieldKind};
use crate::types::{Color, Fields, ValidationError};

/// Values a fresh form shows when a category is selected.
///
/// Toggles take their schema defaults. Color fields take the last color
/// used for that field (`remembered`, keyed by field name), or the preset.
/// Numeric fields stay empty.
pub fn prefill(
    category: Category,
    remembered: &BTreeMap<&str, Color>,
) -> Result<Fields, ValidationError> {
    let mut fields = Fields::new();
    for spec in category.fields() {
        match spec.default {
            Some(FieldDefault::Flag(flag)) => fields.insert(spec.name, flag),
            Some(FieldDefault::Color(preset)) => {
                let color = match remembered.get(spec.name) {
                    Some(color) => color.clone(),
                    None => Color::new(preset)?,
                };
                fields.insert(spec.name, color);
            }
            None => {}
        }
    }
    Ok(fields)
}

/// Fills the gaps of a submission from the pre-filled form.
///
/// Omitted toggles take the form value. An omitted color is taken from the
/// form only when its toggle ends up true; otherwise it stays empty, like a
/// disabled color picker.
pub fn complete(category: Category, submitted: Fields, form: &Fields) -> Fields {
    let mut fields = submitted;

    for spec in category.fields() {
        if spec.kind == FieldKind::Bool && !fields.contains(spec.name) {
            if let Some(flag) = form.flag(spec.name) {
                fields.insert(spec.name, flag);
            }
        }
    }

    for spec in category.fields() {
        if spec.kind != FieldKind::Color || fields.contains(spec.name) {
            continue;
        }
        let enabled = spec.toggle.is_none_or(|toggle| fields.flag(toggle) == Some(true));
        if let (true, Some(color)) = (enabled, form.color(spec.name)) {
            fields.insert(spec.name, color.clone());
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{DEFAULT_PEE_COLOR, DEFAULT_POO_COLOR};

    fn color(value: &str) -> Color {
        Color::new(value).unwrap()
    }

    #[test]
    fn diaper_form_uses_presets_without_history() {
        let form = prefill(Category::Diaper, &BTreeMap::new()).unwrap();

        assert_eq!(form.flag("changed"), Some(true));
        assert_eq!(form.flag("pee"), Some(false));
        assert_eq!(form.flag("poo"), Some(false));
        assert_eq!(form.color("pee_color"), Some(&color(DEFAULT_PEE_COLOR)));
        assert_eq!(form.color("poo_color"), Some(&color(DEFAULT_POO_COLOR)));
    }

    #[test]
    fn diaper_form_remembers_last_colors() {
        let remembered = BTreeMap::from([("poo_color", color("#3A5F0B"))]);
        let form = prefill(Category::Diaper, &remembered).unwrap();

        assert_eq!(form.color("poo_color"), Some(&color("#3A5F0B")));
        assert_eq!(form.color("pee_color"), Some(&color(DEFAULT_PEE_COLOR)));
    }

    #[test]
    fn numeric_fields_stay_empty() {
        let drink = prefill(Category::Drink, &BTreeMap::new()).unwrap();
        assert_eq!(drink.len(), 2);
        assert_eq!(drink.flag("breast_left"), Some(false));
        assert!(!drink.contains("breastmilk_ml"));

        assert!(prefill(Category::Doctor, &BTreeMap::new()).unwrap().is_empty());
    }

    #[test]
    fn complete_fills_toggles_and_enabled_colors() {
        let form = prefill(Category::Diaper, &BTreeMap::new()).unwrap();
        let submitted = Fields::new().with("pee", true);

        let fields = complete(Category::Diaper, submitted, &form);

        assert_eq!(fields.flag("changed"), Some(true));
        assert_eq!(fields.flag("pee"), Some(true));
        assert_eq!(fields.flag("poo"), Some(false));
        assert_eq!(fields.color("pee_color"), Some(&color(DEFAULT_PEE_COLOR)));
        assert_eq!(fields.color("poo_color"), None);
        assert_eq!(Category::Diaper.validate(&fields), Ok(()));
    }

    #[test]
    fn complete_keeps_explicit_values() {
        let form = prefill(Category::Diaper, &BTreeMap::new()).unwrap();
        let submitted = Fields::new()
            .with("changed", false)
            .with("poo", true)
            .with("poo_color", color("#000000"));

        let fields = complete(Category::Diaper, submitted, &form);

        assert_eq!(fields.flag("changed"), Some(false));
        assert_eq!(fields.color("poo_color"), Some(&color("#000000")));
        assert_eq!(fields.color("pee_color"), None);
    }
}
