//! Registration Form Validation
//!
//! `#form-cadastro` is checked in full on every submission. Each field is
//! evaluated independently, failures are annotated inline and linked through
//! `aria-describedby`, and the form never reaches the network.

use std::sync::LazyLock;

use eco_a11y::{AriaState, aria_bool};
use eco_dom::{Document, DomResult, EventKind, NodeId, UiEvent};
use regex::Regex;

use crate::behavior::{Behavior, PageNotice};
use crate::masks::{CEP_MASK, CPF_MASK, Mask, PHONE_MASK};
use crate::page::PageContext;

/// Registration form id
pub const FORM_ID: &str = "form-cadastro";

const ERROR_CLASS: &str = "input-error";
const MESSAGE_CLASS: &str = "error-message";
const MIN_PASSWORD_CHARS: usize = 8;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("e-mail pattern compiles"));

/// Whether `value` has the `local@domain.tld` shape
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Check applied after the required test
#[derive(Debug, Clone, Copy)]
enum Check {
    /// Trimmed value must be non-empty
    NotBlank,
    /// Raw value must be non-empty
    NotEmpty,
    Email { invalid: &'static str },
    MinChars { min: usize, short: &'static str },
    Masked { pattern: &'static str, incomplete: &'static str },
    SameAs { other: &'static str, mismatch: &'static str },
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    id: &'static str,
    /// Message when the field is empty (or missing)
    required: &'static str,
    check: Check,
}

const RULES: &[FieldRule] = &[
    FieldRule {
        id: "nome",
        required: "Por favor, preencha seu nome completo.",
        check: Check::NotBlank,
    },
    FieldRule {
        id: "email",
        required: "O campo e-mail é obrigatório.",
        check: Check::Email { invalid: "Digite um e-mail válido." },
    },
    FieldRule {
        id: "cpf",
        required: "O campo CPF é obrigatório.",
        check: Check::Masked {
            pattern: CPF_MASK,
            incomplete: "CPF incompleto. Verifique os números.",
        },
    },
    FieldRule {
        id: "telefone",
        required: "O campo telefone é obrigatório.",
        check: Check::Masked {
            pattern: PHONE_MASK,
            incomplete: "Telefone incompleto. Verifique os números.",
        },
    },
    FieldRule {
        id: "nascimento",
        required: "Data de nascimento é obrigatória.",
        check: Check::NotEmpty,
    },
    FieldRule {
        id: "endereco",
        required: "Endereço é obrigatório.",
        check: Check::NotBlank,
    },
    FieldRule {
        id: "cidade",
        required: "Cidade é obrigatória.",
        check: Check::NotBlank,
    },
    FieldRule {
        id: "estado",
        required: "Selecione um estado.",
        check: Check::NotEmpty,
    },
    FieldRule {
        id: "cep",
        required: "O campo CEP é obrigatório.",
        check: Check::Masked {
            pattern: CEP_MASK,
            incomplete: "CEP incompleto. Verifique os números.",
        },
    },
    FieldRule {
        id: "senha",
        required: "A senha é obrigatória.",
        check: Check::MinChars {
            min: MIN_PASSWORD_CHARS,
            short: "A senha deve ter no mínimo 8 caracteres.",
        },
    },
    FieldRule {
        id: "confirma-senha",
        required: "Confirme sua senha.",
        check: Check::SameAs {
            other: "senha",
            mismatch: "As senhas não conferem.",
        },
    },
];

/// Ids of every validated field, in evaluation order
pub fn field_ids() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|r| r.id)
}

/// Outcome for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldResult {
    pub field: String,
    pub error: Option<String>,
}

impl FieldResult {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of one submission attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub fields: Vec<FieldResult>,
}

impl ValidationReport {
    /// True when no field failed
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(FieldResult::is_valid)
    }

    /// Failing fields as `(id, message)`
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.error.as_deref().map(|e| (f.field.as_str(), e)))
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Message for `field`, if it failed
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .and_then(|f| f.error.as_deref())
    }
}

fn evaluate(rule: &FieldRule, value: &str, doc: &Document) -> Option<&'static str> {
    // Passwords are taken verbatim: whitespace counts towards length and equality
    let missing = match rule.check {
        Check::NotEmpty | Check::MinChars { .. } | Check::SameAs { .. } => value.is_empty(),
        _ => value.trim().is_empty(),
    };
    match rule.check {
        Check::NotBlank | Check::NotEmpty => missing.then_some(rule.required),
        _ if missing => Some(rule.required),
        Check::Email { invalid } => (!is_valid_email(value)).then_some(invalid),
        Check::MinChars { min, short } => (value.chars().count() < min).then_some(short),
        Check::Masked { pattern, incomplete } => {
            (!Mask::new(pattern).is_complete(value)).then_some(incomplete)
        }
        Check::SameAs { other, mismatch } => {
            let expected = doc
                .get_element_by_id(other)
                .and_then(|n| doc.tree().value(n));
            (expected.as_deref() != Some(value)).then_some(mismatch)
        }
    }
}

/// Evaluate every field of the registration form without touching the DOM
pub fn validate_fields(doc: &Document) -> ValidationReport {
    let fields = RULES
        .iter()
        .map(|rule| {
            let value = doc
                .get_element_by_id(rule.id)
                .and_then(|n| doc.tree().value(n));
            let error = match value {
                Some(value) => evaluate(rule, &value, doc),
                None => {
                    tracing::warn!("Registration field #{} is missing", rule.id);
                    Some(rule.required)
                }
            };
            FieldResult {
                field: rule.id.to_string(),
                error: error.map(str::to_string),
            }
        })
        .collect();
    ValidationReport { fields }
}

/// Remove every error annotation from the document
pub fn clear_errors(doc: &mut Document) -> DomResult<()> {
    for field in doc.query_selector_all(&format!(".{ERROR_CLASS}")) {
        doc.set_class(field, ERROR_CLASS, false)?;
        doc.remove_attr(field, AriaState::Invalid.attr())?;
        doc.remove_attr(field, AriaState::DescribedBy.attr())?;
    }
    for message in doc.query_selector_all(&format!(".{MESSAGE_CLASS}")) {
        doc.tree_mut().release(message);
    }
    Ok(())
}

/// Annotate `field` with `message`, reusing an existing message element
pub fn show_error(doc: &mut Document, field: NodeId, field_id: &str, message: &str) -> DomResult<()> {
    let message_id = format!("{field_id}-error");
    doc.set_class(field, ERROR_CLASS, true)?;
    doc.set_attr(field, AriaState::Invalid.attr(), aria_bool(true))?;
    doc.set_attr(field, AriaState::DescribedBy.attr(), &message_id)?;

    if let Some(existing) = doc.get_element_by_id(&message_id) {
        return doc.tree_mut().set_text_content(existing, message);
    }

    let tree = doc.tree_mut();
    let small = tree.create_element("small");
    if let Some(elem) = tree.element_mut(small) {
        elem.set_attr("class", MESSAGE_CLASS);
        elem.set_attr("id", &message_id);
    }
    tree.set_text_content(small, message)?;
    let parent = tree.parent(field).unwrap_or(field);
    tree.append_child(parent, small)
}

/// Validates `#form-cadastro` on submit
#[derive(Debug, Default)]
pub struct FormValidator {
    form: Option<NodeId>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a registration form is bound
    pub fn is_bound(&self) -> bool {
        self.form.is_some()
    }

    fn annotate(ctx: &mut PageContext, report: &ValidationReport) -> DomResult<()> {
        clear_errors(&mut ctx.document)?;
        for (field_id, message) in report.errors() {
            if let Some(field) = ctx.document.get_element_by_id(field_id) {
                show_error(&mut ctx.document, field, field_id, message)?;
            }
        }
        Ok(())
    }
}

impl Behavior for FormValidator {
    fn name(&self) -> &'static str {
        "validator"
    }

    fn attach(&mut self, ctx: &mut PageContext) {
        self.form = ctx.document.get_element_by_id(FORM_ID);
        if self.form.is_some() {
            tracing::debug!("Registration form bound");
        }
    }

    fn handle_event(&mut self, ctx: &mut PageContext, event: &mut UiEvent) {
        if event.kind != EventKind::Submit || self.form != Some(event.target) {
            return;
        }
        event.prevent_default();

        let report = validate_fields(&ctx.document);
        if let Err(e) = Self::annotate(ctx, &report) {
            tracing::error!("Failed to annotate registration form: {}", e);
        }

        if report.is_valid() {
            tracing::info!("Registration form accepted");
            ctx.notify(PageNotice::RegistrationAccepted);
        } else {
            tracing::debug!("Registration form rejected with {} error(s)", report.error_count());
        }
        ctx.record_report(report);
    }
}
