//! Parse `include` aggregate commands like `COUNT(*) Total, MIN(Age)`.

use query_engine_sql::sql;

use crate::translation::helpers::Scope;

/// An aggregate command: a function name, its arguments as written, and an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCommand {
    pub name: String,
    pub args: Vec<String>,
    pub alias: Option<String>,
}

impl AggregateCommand {
    /// The key the command's value is reported under: its alias,
    /// or the command as written, like `Count(*)` or `ADD(6,2)`.
    pub fn label(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => format!("{}({})", self.name, self.args.join(",")),
        }
    }

    /// Does the command call the named function, ignoring case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Parse a comma separated list of commands. Malformed commands are dropped.
pub fn parse_commands(include: &str) -> Vec<AggregateCommand> {
    split_top_level(include)
        .into_iter()
        .filter(|command| !command.is_empty())
        .filter_map(|command| {
            let parsed = parse_command(command);
            if parsed.is_none() {
                tracing::debug!("dropping malformed aggregate command '{command}'");
            }
            parsed
        })
        .collect()
}

fn parse_command(command: &str) -> Option<AggregateCommand> {
    let name_end = command
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(command.len());
    let (name, rest) = command.split_at(name_end);
    if name.is_empty() {
        return None;
    }

    let rest = rest.trim_start();
    let (args, rest) = match rest.strip_prefix('(') {
        Some(inner) => {
            let close = find_closing_paren(inner)?;
            let args = split_top_level(&inner[..close])
                .into_iter()
                .filter(|arg| !arg.is_empty())
                .map(str::to_string)
                .collect();
            (args, &inner[close + 1..])
        }
        // a bare COUNT counts rows
        None if name.eq_ignore_ascii_case("COUNT") => (vec!["*".to_string()], rest),
        None => (vec![], rest),
    };

    Some(AggregateCommand {
        name: name.to_string(),
        args,
        alias: parse_alias(rest)?,
    })
}

/// What follows a command: nothing, `alias` or `AS alias`.
/// `None` when it is anything else.
fn parse_alias(rest: &str) -> Option<Option<String>> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(None);
    }
    let alias = match rest.get(..3) {
        Some(keyword) if keyword.eq_ignore_ascii_case("as ") => rest[3..].trim(),
        _ => rest,
    };
    let valid = !alias.is_empty() && alias.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then(|| Some(alias.to_string()))
}

/// Find the parenthesis closing an already opened one.
fn find_closing_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    for (index, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') if depth == 0 => return Some(index),
            (None, ')') => depth -= 1,
            (None, _) => {}
        }
    }
    None
}

/// Split on commas outside of parentheses and quotes, trimming each part.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(text[start..index].trim());
                start = index + 1;
            }
            (None, _) => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

/// Translate a command to one of the built-in aggregates, if it is one and its arguments are
/// columns in scope: `COUNT(*)`, `COUNT(DISTINCT column)`, `COUNT(column)`, and `MIN`, `MAX`,
/// `SUM` and `AVG` of a column.
pub fn translate_builtin(scope: &Scope, command: &AggregateCommand) -> Option<sql::ast::Expression> {
    let [arg] = command.args.as_slice() else {
        return None;
    };
    let column = |name: &str| scope.lookup_column(name.trim()).map(|column| column.reference);

    if command.is("COUNT") {
        if arg == "*" {
            return Some(sql::ast::Expression::Count(sql::ast::CountType::Star));
        }
        let distinct = arg
            .get(..9)
            .filter(|keyword| keyword.eq_ignore_ascii_case("DISTINCT "))
            .map(|_| &arg[9..]);
        return match distinct {
            Some(name) => column(name).map(sql::ast::CountType::Distinct),
            None => column(arg).map(sql::ast::CountType::Simple),
        }
        .map(sql::ast::Expression::Count);
    }

    let function = [
        ("MIN", sql::ast::Function::Min),
        ("MAX", sql::ast::Function::Max),
        ("SUM", sql::ast::Function::Sum),
        ("AVG", sql::ast::Function::Avg),
    ]
    .into_iter()
    .find_map(|(name, function)| command.is(name).then_some(function))?;

    column(arg).map(|column| sql::ast::Expression::FunctionCall {
        function,
        args: vec![sql::ast::Expression::ColumnReference(column)],
    })
}
