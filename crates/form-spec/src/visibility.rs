use crate::answers::{AnswerSet, AnswerValue};
use crate::spec::form::FormDefinition;
use crate::spec::question::Question;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Whether `question` is shown for the given answers.
///
/// Without a rule the question is always shown. With one, the source answer
/// must be a single string equal to the required value; list answers never
/// match.
pub fn is_visible(form: &FormDefinition, question: &Question, answers: &AnswerSet) -> bool {
    let Some(rule) = form.rules.for_target(&question.field_id) else {
        return true;
    };
    matches!(
        answers.get(&rule.source_field_id),
        Some(AnswerValue::Text(value)) if *value == rule.required_value
    )
}

/// Questions currently shown, in form order.
pub fn visible_questions<'a>(form: &'a FormDefinition, answers: &AnswerSet) -> Vec<&'a Question> {
    let visible: Vec<_> = form
        .questions
        .iter()
        .filter(|question| is_visible(form, question, answers))
        .collect();
    tracing::debug!(
        form_id = %form.id,
        visible = visible.len(),
        total = form.questions.len(),
        "evaluated question visibility"
    );
    visible
}

pub fn resolve_visibility(form: &FormDefinition, answers: &AnswerSet) -> VisibilityMap {
    form.questions
        .iter()
        .map(|question| {
            (
                question.field_id.clone(),
                is_visible(form, question, answers),
            )
        })
        .collect()
}

/// Drops answers belonging to hidden questions.
///
/// Clearing one answer can hide a later question, so visibility is judged
/// against the answers kept so far. Sources always precede their targets, so
/// one pass in form order is enough.
pub fn retain_visible(form: &FormDefinition, answers: &AnswerSet) -> AnswerSet {
    let mut kept = AnswerSet::new();
    for question in &form.questions {
        let Some(value) = answers.get(&question.field_id) else {
            continue;
        };
        if is_visible(form, question, &kept) {
            kept.insert(question.field_id.clone(), value.clone());
        } else {
            tracing::debug!(field_id = %question.field_id, "dropping answer of hidden question");
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{FieldType, FormDefinition, RuleSet, TableRef, VisibilityRule};

    fn chained_form() -> FormDefinition {
        FormDefinition {
            id: "form-1".into(),
            name: "Chain".into(),
            owner_id: "owner".into(),
            table: TableRef::new("app1", "tbl1"),
            questions: vec![
                Question::new("a", "A", FieldType::SingleSelect).with_options(["yes", "no"]),
                Question::new("b", "B", FieldType::SingleSelect).with_options(["yes", "no"]),
                Question::new("c", "C", FieldType::ShortText),
            ],
            rules: RuleSet::from(vec![
                VisibilityRule::new("b", "a", "yes"),
                VisibilityRule::new("c", "b", "yes"),
            ]),
        }
    }

    #[test]
    fn stale_answers_still_drive_evaluation() {
        let form = chained_form();
        let answers = AnswerSet::new().with("a", "no").with("b", "yes");
        let ids: Vec<_> = visible_questions(&form, &answers)
            .into_iter()
            .map(|question| question.field_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn retain_visible_cascades_through_chains() {
        let form = chained_form();
        let answers = AnswerSet::new()
            .with("a", "no")
            .with("b", "yes")
            .with("c", "kept?");
        let kept = retain_visible(&form, &answers);
        assert_eq!(kept, AnswerSet::new().with("a", "no"));
    }

    #[test]
    fn retain_visible_keeps_everything_when_all_shown() {
        let form = chained_form();
        let answers = AnswerSet::new()
            .with("a", "yes")
            .with("b", "yes")
            .with("c", "kept");
        assert_eq!(retain_visible(&form, &answers), answers);
    }

    #[test]
    fn resolve_visibility_covers_every_question() {
        let form = chained_form();
        let map = resolve_visibility(&form, &AnswerSet::new());
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("a"), Some(&true));
        assert_eq!(map.get("b"), Some(&false));
        assert_eq!(map.get("c"), Some(&false));
    }
}
