use super::settings::CompilerSettings;

/// One step of a scanned template, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Text outside any delimiter, copied verbatim.
    Literal(String),
    /// Code whose value is appended to the output.
    Emit(String),
    /// Code whose value is HTML-escaped, then appended.
    EmitEscaped(String),
    /// Code executed for its effect; produces no output by itself.
    Statement(String),
}

/// Splits `source` into instructions in a single left-to-right pass.
///
/// Delimiter matches are found with the combined pattern; everything between
/// matches becomes a literal, and the text after the last match is flushed at
/// the end.
pub fn scan(source: &str, settings: &CompilerSettings) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut index = 0;
    let has_escape = settings.escape().is_some();

    for captures in settings.combined().captures_iter(source) {
        let Some(whole) = captures.get(0) else { continue };

        if whole.start() > index {
            instructions.push(Instruction::Literal(source[index..whole.start()].to_string()));
        }
        index = whole.end();

        // Group numbering follows the alternation order in the combined pattern.
        let mut group = 1;
        if has_escape {
            if let Some(code) = non_blank(captures.get(group).map(|m| m.as_str())) {
                instructions.push(Instruction::EmitEscaped(code));
                continue;
            }
            group += 1;
        }
        if let Some(code) = non_blank(captures.get(group).map(|m| m.as_str())) {
            instructions.push(Instruction::Emit(code));
        } else if let Some(code) = non_blank(captures.get(group + 1).map(|m| m.as_str())) {
            instructions.push(Instruction::Statement(code));
        }
    }

    if index < source.len() {
        instructions.push(Instruction::Literal(source[index..].to_string()));
    }

    instructions
}

fn non_blank(code: Option<&str>) -> Option<String> {
    code.map(str::trim).filter(|code| !code.is_empty()).map(str::to_string)
}
