//! Fixed-width reconstruction of an interpreted receipt

use core_kernel::{format_amount, Currency};
use domain_document::InterpretedReceipt;
use rust_decimal::Decimal;

/// Characters per line of a printed till receipt
pub const RECEIPT_WIDTH: usize = 42;

/// Renders the receipt as monospaced lines no longer than `width` characters
pub fn receipt_lines(receipt: &InterpretedReceipt, width: usize, currency: Currency) -> Vec<String> {
    let width = width.max(16);
    let rule = "-".repeat(width);
    let mut lines = Vec::new();

    let store = if receipt.store_name.trim().is_empty() {
        "RECEIPT".to_string()
    } else {
        receipt.store_name.trim().to_uppercase()
    };
    for chunk in chunk_chars(&store, width) {
        lines.push(center(&chunk, width));
    }
    if !receipt.date.trim().is_empty() {
        lines.push(center(receipt.date.trim(), width));
    }
    lines.push(rule.clone());

    for line in &receipt.items {
        lines.extend(chunk_chars(line.description.trim(), width));
        let detail = format!(
            "  {} x {}",
            line.quantity.normalize(),
            format_amount(line.unit_price, currency)
        );
        lines.push(justify(&detail, &format_amount(line.total, currency), width));
    }

    lines.push(rule);
    lines.push(amount_line("SUBTOTAL", receipt.subtotal, currency, width));
    lines.push(amount_line("TAX", receipt.tax, currency, width));
    lines.push(amount_line("TOTAL", receipt.total, currency, width));
    lines
}

fn amount_line(label: &str, amount: Decimal, currency: Currency, width: usize) -> String {
    justify(label, &format_amount(amount, currency), width)
}

/// Left text and right text on one line, the left side truncated if both
/// don't fit
fn justify(left: &str, right: &str, width: usize) -> String {
    let right_len = right.chars().count();
    let room = width.saturating_sub(right_len + 1);
    let left: String = left.chars().take(room).collect();
    let gap = width.saturating_sub(left.chars().count() + right_len).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let pad = width.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Word-wraps to `width` characters, hard-breaking longer words
fn chunk_chars(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word: Vec<char> = word.chars().collect();
        for piece in word.chunks(width) {
            let piece: String = piece.iter().collect();
            let needed = current.chars().count() + piece.chars().count() + usize::from(!current.is_empty());
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
