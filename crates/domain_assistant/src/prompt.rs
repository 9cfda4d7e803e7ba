//! Prompt composition
//!
//! System instructions carry the role, tone, material grade and the
//! company's own price catalog; the user prompt carries the request text and,
//! for item kinds, a short guide to the columns being filled.

use std::fmt::Write;

use core_kernel::format_amount;
use domain_document::{ColumnRegistry, Company, DataType, InputType};

use crate::request::{SuggestionKind, SuggestionRequest};

const ROLE: &str = "You help a contractor prepare quotes and invoices for their clients.";

fn task(kind: SuggestionKind) -> &'static str {
    match kind {
        SuggestionKind::Description => {
            "Write the description of the work for the document, one or two short paragraphs. Reply with the text only."
        }
        SuggestionKind::Terms => {
            "Write the terms and conditions for the document as short paragraphs separated by blank lines. Reply with the text only."
        }
        SuggestionKind::Items => {
            "List the line items needed for the described work. Reply with JSON matching the schema."
        }
        SuggestionKind::BulkItems => {
            "Group the line items needed for the described work into cost categories such as labor and materials. Reply with JSON matching the schema."
        }
        SuggestionKind::Receipt => {
            "Read the attached purchase receipt. Transcribe the store name, the date as YYYY-MM-DD, every line and the totals exactly as printed. Reply with JSON matching the schema."
        }
    }
}

/// Catalog of the company's own prices, empty when it has none
pub fn pricing_context(company: &Company) -> String {
    let mut context = String::new();
    if !company.pricing_templates.is_empty() {
        context.push_str("Use these prices whenever an item matches:\n");
        for template in &company.pricing_templates {
            let _ = writeln!(
                context,
                "- {} ({}): {} per {}",
                template.name,
                template.kind,
                format_amount(template.unit_price, company.currency),
                if template.unit.is_empty() { "unit" } else { &template.unit },
            );
        }
    }
    if !company.tools.is_empty() {
        context.push_str("Equipment available, charged per day of use:\n");
        for tool in &company.tools {
            let _ = writeln!(
                context,
                "- {}: {}",
                tool.name,
                format_amount(tool.daily_cost, company.currency)
            );
        }
    }
    context
}

pub fn system_instruction(kind: SuggestionKind, request: &SuggestionRequest, company: Option<&Company>) -> String {
    let mut instruction = format!("{ROLE}\n{}\n{}", task(kind), request.tone.instruction());
    if matches!(kind, SuggestionKind::Items | SuggestionKind::BulkItems) {
        instruction.push('\n');
        instruction.push_str(request.quality.instruction());
    }
    if let Some(company) = company {
        if kind != SuggestionKind::Receipt {
            let _ = write!(
                instruction,
                "\nThe company is {} and prices in {}.",
                company.name,
                company.currency.code()
            );
            let context = pricing_context(company);
            if !context.is_empty() {
                instruction.push('\n');
                instruction.push_str(context.trim_end());
            }
        }
    }
    instruction
}

/// One line per column the service is asked to fill
pub fn column_guide(registry: &ColumnRegistry) -> String {
    let mut guide = String::from("Fields of each item:\n");
    for column in registry.generation_columns() {
        let definition = &column.definition;
        let kind = match (definition.input_type, definition.data_type) {
            (InputType::Select, _) => format!("one of: {}", definition.options.join(", ")),
            (_, DataType::Number) => "number".to_string(),
            (_, DataType::Boolean) => "true or false".to_string(),
            (_, DataType::Date) => "date, YYYY-MM-DD".to_string(),
            (_, DataType::Time) => "time, HH:MM".to_string(),
            _ => "text".to_string(),
        };
        let _ = writeln!(guide, "- {} ({}): {}", column.key, definition.label, kind);
    }
    guide
}

pub fn user_prompt(kind: SuggestionKind, request: &SuggestionRequest, registry: &ColumnRegistry) -> String {
    let mut prompt = request.prompt.trim().to_string();
    if prompt.is_empty() {
        prompt = match kind {
            SuggestionKind::Receipt => "Interpret this receipt.".to_string(),
            _ => "Base the answer on the attached images.".to_string(),
        };
    }
    if matches!(kind, SuggestionKind::Items | SuggestionKind::BulkItems) {
        prompt.push_str("\n\n");
        prompt.push_str(column_guide(registry).trim_end());
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Quality, Tone};
    use domain_document::{PricingTemplate, ToolEntry};
    use rust_decimal_macros::dec;

    fn company() -> Company {
        let mut company = Company::new("Acme Builders");
        company.pricing_templates.push(PricingTemplate {
            name: "Drywall install".to_string(),
            kind: "labor".to_string(),
            unit: "m2".to_string(),
            unit_price: dec!(85),
        });
        company.tools.push(ToolEntry {
            name: "Scaffold".to_string(),
            daily_cost: dec!(250),
        });
        company
    }

    #[test]
    fn test_pricing_context_lists_catalog() {
        let context = pricing_context(&company());
        assert!(context.contains("- Drywall install (labor): $85.00 per m2"));
        assert!(context.contains("- Scaffold: $250.00"));
        assert!(pricing_context(&Company::new("Empty")).is_empty());
    }

    #[test]
    fn test_quality_only_for_item_kinds() {
        let request = SuggestionRequest::new("x").with_quality(Quality::Premium).with_tone(Tone::Concise);
        let items = system_instruction(SuggestionKind::Items, &request, None);
        let terms = system_instruction(SuggestionKind::Terms, &request, None);

        assert!(items.contains("premium-grade"));
        assert!(!terms.contains("premium-grade"));
        assert!(terms.contains(Tone::Concise.instruction()));
    }

    #[test]
    fn test_column_guide_skips_derived() {
        let guide = column_guide(&ColumnRegistry::seeded());
        assert!(guide.contains("- quantity (Qty): number"));
        assert!(!guide.contains("- total"));
    }
}
