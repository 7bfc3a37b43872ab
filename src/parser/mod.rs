pub mod lexer;

use crate::transpiler::ast::*;
use crate::transpiler::mapper::TypeRegistry;
use lexer::{join_tokens, tokenize, Token};

const PARAMETER_QUALIFIERS: &[&str] = &["memory", "storage", "calldata", "payable"];
const EVENT_QUALIFIERS: &[&str] = &["indexed", "memory", "storage", "calldata", "payable"];
const STORAGE_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "internal",
    "external",
    "immutable",
    "payable",
    "transient",
    "override",
    "constant",
];
const FRAGMENT_TOKENS: usize = 12;

type Outcome<T> = Result<T, SkipReason>;

/// Pulls the structural declarations out of Solidity source.
///
/// Never fails: anything that cannot be recognized is left out of the model and
/// reported in [`Extraction::diagnostics`] instead.
pub fn extract(source: &str, types: &TypeRegistry) -> Extraction {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            return Extraction {
                contract: ContractModel::default(),
                diagnostics: vec![Diagnostic {
                    line: 1,
                    fragment: String::new(),
                    reason: SkipReason::Unlexable(e.to_string()),
                }],
            };
        }
    };

    let mut scanner = Scanner::new(&tokens, types);
    scanner.scan_items(tokens.len());
    scanner.finish()
}

/// How the item starting at some index ends.
enum Terminator {
    Semicolon(usize),
    Block(usize, usize),
    OpenBlock(usize),
    End,
}

struct Scanner<'t, 'a> {
    tokens: &'t [Token<'a>],
    types: &'t TypeRegistry,
    pos: usize,
    contract: ContractModel,
    named: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'t, 'a> Scanner<'t, 'a> {
    fn new(tokens: &'t [Token<'a>], types: &'t TypeRegistry) -> Self {
        Scanner {
            tokens,
            types,
            pos: 0,
            contract: ContractModel::default(),
            named: false,
            diagnostics: Vec::new(),
        }
    }

    fn finish(self) -> Extraction {
        Extraction {
            contract: self.contract,
            diagnostics: self.diagnostics,
        }
    }

    fn scan_items(&mut self, end: usize) {
        while self.pos < end {
            let start = self.pos;
            let token = self.tokens[start];

            if !token.is_identifier() {
                self.pos = if token.is("{") {
                    self.matching_close(start, end).map_or(end, |close| close + 1)
                } else {
                    start + 1
                };
                continue;
            }

            self.pos = match token.text {
                "pragma" | "import" | "using" | "error" => self.item_end(start, end),
                "contract" => self.scan_contract(start, end),
                "abstract" if self.is_at(start + 1, "contract") => self.scan_contract(start + 1, end),
                "interface" | "library" => self.scan_shared(start, end),
                "modifier" => self.skip_unsupported(start, end, "modifier"),
                "fallback" => self.skip_unsupported(start, end, "fallback"),
                "receive" => self.skip_unsupported(start, end, "receive"),
                "enum" => self.skip_unsupported(start, end, "enum"),
                "type" if self.is_at(start + 2, "is") => {
                    self.skip_unsupported(start, end, "user-defined value type")
                }
                "struct" => self.scan_struct(start, end),
                "event" => self.scan_event(start, end),
                "function" => self.scan_function(start, end),
                "constructor" => self.scan_constructor(start, end),
                _ => self.scan_storage(start, end),
            };
        }
    }

    fn scan_contract(&mut self, start: usize, end: usize) -> usize {
        let name = match self.identifier_at(start + 1) {
            Some(name) => name,
            None => return self.malformed(start, start + 1, end, "a contract name"),
        };

        if !self.named {
            self.contract.name = name.to_string();
            self.named = true;
        }

        match self.terminator(start + 2, end) {
            Terminator::Block(open, close) => {
                self.pos = open + 1;
                self.scan_items(close);
                close + 1
            }
            Terminator::OpenBlock(open) => {
                self.skip(open, format!("contract {}", name), SkipReason::UnterminatedBlock("{"));
                self.pos = open + 1;
                self.scan_items(end);
                end
            }
            Terminator::Semicolon(_) | Terminator::End => {
                self.malformed(start, start + 2, end, "a contract body")
            }
        }
    }

    /// Interfaces and libraries contribute their structs and events; their functions are not contract members.
    fn scan_shared(&mut self, start: usize, end: usize) -> usize {
        let name = match self.identifier_at(start + 1) {
            Some(name) => name,
            None => return self.malformed(start, start + 1, end, "a name"),
        };

        let (open, close, next) = match self.terminator(start + 2, end) {
            Terminator::Block(open, close) => (open, close, close + 1),
            Terminator::OpenBlock(open) => {
                let kind = self.tokens[start].text;
                self.skip(open, format!("{} {}", kind, name), SkipReason::UnterminatedBlock("{"));
                (open, end, end)
            }
            Terminator::Semicolon(_) | Terminator::End => {
                return self.malformed(start, start + 2, end, "a body");
            }
        };

        let mut index = open + 1;
        while index < close {
            index = match self.tokens[index].text {
                "struct" => self.scan_struct(index, close),
                "event" => self.scan_event(index, close),
                _ => self.item_end(index, close),
            };
        }
        next
    }

    fn scan_struct(&mut self, start: usize, end: usize) -> usize {
        let name = match self.identifier_at(start + 1) {
            Some(name) => name,
            None => return self.malformed(start, start + 1, end, "a struct name"),
        };
        if !self.is_at(start + 2, "{") {
            return self.malformed(start, start + 2, end, "`{`");
        }
        let close = match self.matching_close(start + 2, end) {
            Some(close) => close,
            None => {
                self.skip(start, format!("struct {}", name), SkipReason::UnterminatedBlock("{"));
                return end;
            }
        };

        if self.contract.structs.iter().any(|s| s.name == name) {
            self.skip(start, format!("struct {}", name), SkipReason::DuplicateDeclaration(name.to_string()));
            return close + 1;
        }

        let mut fields = Vec::new();
        for (from, to) in self.split(start + 3, close, ";") {
            if from == to {
                continue;
            }
            match self.field(from, to) {
                Ok(field) => fields.push(field),
                Err(reason) => self.skip(from, join_tokens(&self.tokens[from..to]), reason),
            }
        }

        self.contract.structs.push(StructDecl {
            name: name.to_string(),
            fields,
        });
        close + 1
    }

    fn scan_event(&mut self, start: usize, end: usize) -> usize {
        let name = match self.identifier_at(start + 1) {
            Some(name) => name,
            None => return self.malformed(start, start + 1, end, "an event name"),
        };
        if !self.is_at(start + 2, "(") {
            return self.malformed(start, start + 2, end, "`(`");
        }
        let close = match self.matching_close(start + 2, end) {
            Some(close) => close,
            None => {
                self.skip(start, format!("event {}", name), SkipReason::UnterminatedBlock("("));
                return end;
            }
        };

        let mut next = close + 1;
        if self.is_at(next, "anonymous") {
            next += 1;
        }
        if self.is_at(next, ";") {
            next += 1;
        }
        let next = next.min(end);

        if self.contract.events.iter().any(|e| e.name == name) {
            self.skip(start, format!("event {}", name), SkipReason::DuplicateDeclaration(name.to_string()));
            return next;
        }

        let params = self
            .parameter_list(start + 2, close, EVENT_QUALIFIERS)
            .into_iter()
            .map(|(param, indexed)| EventParameter {
                name: param.name,
                param_type: param.param_type,
                indexed,
            })
            .collect();

        self.contract.events.push(EventDecl {
            name: name.to_string(),
            params,
        });
        next
    }

    fn scan_function(&mut self, start: usize, end: usize) -> usize {
        let name = match self.identifier_at(start + 1) {
            Some(name) => name,
            None => return self.malformed(start, start + 1, end, "a function name"),
        };
        if !self.is_at(start + 2, "(") {
            return self.malformed(start, start + 2, end, "`(`");
        }

        let (function, next) = self.callable(start, start + 2, end, name);
        if let Some(function) = function {
            self.contract.functions.push(function);
        }
        next
    }

    fn scan_constructor(&mut self, start: usize, end: usize) -> usize {
        if !self.is_at(start + 1, "(") {
            return self.malformed(start, start + 1, end, "`(`");
        }
        if self.contract.constructor().is_some() {
            let next = self.item_end(start, end);
            let fragment = self.fragment(start, next);
            self.skip(start, fragment, SkipReason::DuplicateConstructor);
            return next;
        }

        let (function, next) = self.callable(start, start + 1, end, "");
        if let Some(function) = function {
            self.contract.functions.push(function);
        }
        next
    }

    /// Parses `( params ) modifiers { body }` where the parameter list opens at `open`.
    /// The body is skipped, only the header is kept.
    fn callable(
        &mut self,
        start: usize,
        open: usize,
        end: usize,
        name: &str,
    ) -> (Option<FunctionDecl>, usize) {
        let display_name = if name.is_empty() { "constructor" } else { name };

        let close = match self.matching_close(open, end) {
            Some(close) => close,
            None => {
                self.skip(start, display_name.to_string(), SkipReason::UnterminatedBlock("("));
                return (None, end);
            }
        };

        let (body_open, next) = match self.terminator(close + 1, end) {
            Terminator::Block(body_open, body_close) => (body_open, body_close + 1),
            Terminator::OpenBlock(body_open) => {
                self.skip(body_open, display_name.to_string(), SkipReason::UnterminatedBlock("{"));
                (body_open, end)
            }
            Terminator::Semicolon(semicolon) => {
                let fragment = self.fragment(start, semicolon);
                self.skip(start, fragment, SkipReason::MissingBody(display_name.to_string()));
                return (None, semicolon + 1);
            }
            Terminator::End => {
                let fragment = self.fragment(start, end);
                self.skip(start, fragment, SkipReason::MissingBody(display_name.to_string()));
                return (None, end);
            }
        };

        let params = self
            .parameter_list(open, close, PARAMETER_QUALIFIERS)
            .into_iter()
            .map(|(param, _)| param)
            .collect();

        let modifiers = &self.tokens[close + 1..body_open];
        let is_view = modifiers.iter().any(|t| t.is("view"));
        let return_type = (close + 1..body_open)
            .find(|&i| self.tokens[i].is("returns") && self.is_at(i + 1, "("))
            .and_then(|i| self.return_type(i + 1, body_open));

        let function = FunctionDecl {
            name: name.to_string(),
            params,
            is_view,
            return_type,
        };
        (Some(function), next)
    }

    fn scan_storage(&mut self, start: usize, end: usize) -> usize {
        match self.terminator(start, end) {
            Terminator::Semicolon(semicolon) => {
                match self.storage_variable(start, semicolon) {
                    Ok(var) => self.contract.storage_vars.push(var),
                    Err(reason) => {
                        let fragment = join_tokens(&self.tokens[start..semicolon]);
                        self.skip(start, fragment, reason);
                    }
                }
                semicolon + 1
            }
            _ => {
                let next = self.item_end(start, end);
                let fragment = self.fragment(start, next);
                self.skip(start, fragment, SkipReason::MalformedDeclaration);
                next
            }
        }
    }

    fn skip_unsupported(&mut self, start: usize, end: usize, kind: &'static str) -> usize {
        let next = self.item_end(start, end);
        let fragment = self.fragment(start, next);
        self.skip(start, fragment, SkipReason::Unsupported(kind));
        next
    }

    /// Reports a header that broke off at `failed_at` and moves past the whole item.
    fn malformed(&mut self, start: usize, failed_at: usize, end: usize, expected: &'static str) -> usize {
        let next = self.item_end(start, end);
        let after = self.tokens[failed_at - 1].text.to_string();
        let fragment = self.fragment(start, next);
        self.skip(failed_at.min(next.saturating_sub(1)), fragment, SkipReason::MalformedHeader { expected, after });
        next
    }

    fn field(&self, from: usize, to: usize) -> Outcome<Field> {
        self.declaration(from, to, PARAMETER_QUALIFIERS)
            .map(|(field_type, name)| Field { name, field_type })
            .ok_or(SkipReason::MalformedField)
    }

    fn parameter(&self, from: usize, to: usize, qualifiers: &[&str]) -> Outcome<(Parameter, bool)> {
        if from == to {
            return Err(SkipReason::EmptyParameter);
        }
        let indexed = self.tokens[from..to].iter().any(|t| t.is("indexed"));
        self.declaration(from, to, qualifiers)
            .map(|(param_type, name)| (Parameter { name, param_type }, indexed))
            .ok_or(SkipReason::MalformedParameter)
    }

    /// Parameters of the list delimited by `open` and `close`; malformed entries are reported and dropped.
    fn parameter_list(&mut self, open: usize, close: usize, qualifiers: &[&str]) -> Vec<(Parameter, bool)> {
        let mut params = Vec::new();
        for (from, to) in self.split(open + 1, close, ",") {
            match self.parameter(from, to, qualifiers) {
                Ok(param) => params.push(param),
                Err(reason) => self.skip(from, join_tokens(&self.tokens[from..to]), reason),
            }
        }
        params
    }

    /// The type of the first entry of the `returns` list opening at `open`.
    fn return_type(&self, open: usize, end: usize) -> Option<String> {
        let close = self.matching_close(open, end)?;
        let (from, to) = self.split(open + 1, close, ",").into_iter().next()?;

        let mut kept = self.kept_tokens(from, to, PARAMETER_QUALIFIERS);
        if kept.len() >= 2 && kept.last().map_or(false, |t| t.is_identifier()) {
            kept.pop();
        }
        if kept.is_empty() {
            return None;
        }
        Some(join_tokens(&kept))
    }

    fn storage_variable(&self, from: usize, to: usize) -> Outcome<StorageVarDecl> {
        let declared = self.find_top_level(from, to, "=").unwrap_or(to);
        let is_constant = self.tokens[from..declared].iter().any(|t| t.is("constant"));

        let (var_type, name) = self
            .declaration(from, declared, STORAGE_MODIFIERS)
            .ok_or(SkipReason::MalformedDeclaration)?;

        if is_constant {
            return Err(SkipReason::ConstantVariable(name));
        }
        if !self.types.is_recognized(&var_type) {
            return Err(SkipReason::UnrecognizedStorageType(var_type));
        }
        Ok(StorageVarDecl { name, var_type })
    }

    /// Splits `type... name` after dropping `ignored` tokens. The name must be an identifier.
    fn declaration(&self, from: usize, to: usize, ignored: &[&str]) -> Option<(String, String)> {
        let kept = self.kept_tokens(from, to, ignored);
        match kept.split_last() {
            Some((name, type_tokens)) if name.is_identifier() && !type_tokens.is_empty() => {
                Some((join_tokens(type_tokens), name.text.to_string()))
            }
            _ => None,
        }
    }

    fn kept_tokens(&self, from: usize, to: usize, ignored: &[&str]) -> Vec<Token<'a>> {
        self.tokens[from..to]
            .iter()
            .filter(|t| !ignored.contains(&t.text))
            .copied()
            .collect()
    }

    fn terminator(&self, start: usize, end: usize) -> Terminator {
        let mut index = start;
        while index < end {
            match self.tokens[index].text {
                ";" => return Terminator::Semicolon(index),
                "{" => {
                    return match self.matching_close(index, end) {
                        Some(close) => Terminator::Block(index, close),
                        None => Terminator::OpenBlock(index),
                    };
                }
                "(" | "[" => match self.matching_close(index, end) {
                    Some(close) => index = close + 1,
                    None => return Terminator::End,
                },
                _ => index += 1,
            }
        }
        Terminator::End
    }

    /// Index just past the item starting at `start`.
    fn item_end(&self, start: usize, end: usize) -> usize {
        match self.terminator(start, end) {
            Terminator::Semicolon(index) => index + 1,
            Terminator::Block(_, close) => close + 1,
            Terminator::OpenBlock(_) | Terminator::End => end,
        }
    }

    /// Index of the delimiter closing the one at `open`, searching no further than `end`.
    fn matching_close(&self, open: usize, end: usize) -> Option<usize> {
        let mut expected: Vec<&str> = Vec::new();
        for index in open..end.min(self.tokens.len()) {
            let text = self.tokens[index].text;
            match text {
                "(" => expected.push(")"),
                "[" => expected.push("]"),
                "{" => expected.push("}"),
                ")" | "]" | "}" => {
                    if expected.last() == Some(&text) {
                        expected.pop();
                        if expected.is_empty() {
                            return Some(index);
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Ranges between `separator` tokens at nesting depth zero. An empty range yields no segments.
    fn split(&self, from: usize, to: usize, separator: &str) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        if from >= to {
            return segments;
        }

        let mut segment_start = from;
        let mut index = from;
        while index < to {
            let text = self.tokens[index].text;
            if text == separator {
                segments.push((segment_start, index));
                segment_start = index + 1;
                index += 1;
            } else if matches!(text, "(" | "[" | "{") {
                index = self.matching_close(index, to).map_or(to, |close| close + 1);
            } else {
                index += 1;
            }
        }
        segments.push((segment_start, to));
        segments
    }

    fn find_top_level(&self, from: usize, to: usize, text: &str) -> Option<usize> {
        let mut index = from;
        while index < to {
            let current = self.tokens[index].text;
            if current == text {
                return Some(index);
            }
            index = if matches!(current, "(" | "[" | "{") {
                self.matching_close(index, to).map_or(to, |close| close + 1)
            } else {
                index + 1
            };
        }
        None
    }

    fn identifier_at(&self, index: usize) -> Option<&'a str> {
        self.tokens
            .get(index)
            .filter(|t| t.is_identifier())
            .map(|t| t.text)
    }

    fn is_at(&self, index: usize, text: &str) -> bool {
        self.tokens.get(index).map_or(false, |t| t.is(text))
    }

    /// Source text of an item header, up to its body and capped in length.
    fn fragment(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        let mut stop = start;
        while stop < end && !self.tokens[stop].is("{") && stop - start < FRAGMENT_TOKENS {
            stop += 1;
        }

        let mut text = join_tokens(&self.tokens[start..stop]);
        if stop - start == FRAGMENT_TOKENS && stop < end && !self.tokens[stop].is("{") {
            text.push_str(" ...");
        }
        text
    }

    fn skip(&mut self, index: usize, fragment: String, reason: SkipReason) {
        let line = self
            .tokens
            .get(index)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line);
        self.diagnostics.push(Diagnostic {
            line,
            fragment,
            reason,
        });
    }
}
