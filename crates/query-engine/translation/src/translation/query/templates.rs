//! Parse and render predicate templates like `UPPER({Field}) LIKE UPPER({Value})`.

use query_engine_sql::sql;

use crate::translation::error::Error;

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<TemplatePart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Text(String),
    /// `{Field}`
    Field,
    /// `{Value}`
    Value,
    /// `{Value1}`
    Value1,
    /// `{Value2}`
    Value2,
    /// `{Values}`, every value separated by commas.
    Values,
}

impl Template {
    pub fn parse(source: &str) -> Result<Template, Error> {
        let invalid = |reason: String| Error::InvalidTemplate {
            template: source.to_string(),
            reason,
        };

        let mut pieces = source.split('{');
        let mut parts = vec![];
        if let Some(text) = pieces.next() {
            push_text(&mut parts, text);
        }
        for piece in pieces {
            let (placeholder, text) = piece
                .split_once('}')
                .ok_or_else(|| invalid("unclosed placeholder".to_string()))?;
            parts.push(match placeholder {
                "Field" => TemplatePart::Field,
                "Value" => TemplatePart::Value,
                "Value1" => TemplatePart::Value1,
                "Value2" => TemplatePart::Value2,
                "Values" => TemplatePart::Values,
                unknown => return Err(invalid(format!("unknown placeholder {{{unknown}}}"))),
            });
            push_text(&mut parts, text);
        }

        Ok(Template {
            source: source.to_string(),
            parts,
        })
    }

    /// Render the template for a column and its values. Values are bound as parameters.
    pub fn render(
        &self,
        column: &str,
        field: &sql::ast::Expression,
        values: &[sql::ast::Value],
    ) -> Result<sql::ast::Expression, Error> {
        let value = |index: usize| {
            values
                .get(index)
                .cloned()
                .map(|value| sql::ast::RawSql::Expression(sql::ast::Expression::Value(value)))
        };
        let pair = |index: usize| {
            value(index)
                .filter(|_| values.len() == 2)
                .ok_or_else(|| Error::InvalidBetweenValue {
                    column: column.to_string(),
                    found: values.len(),
                })
        };

        let mut rendered = vec![];
        for part in &self.parts {
            match part {
                TemplatePart::Text(text) => rendered.push(sql::ast::RawSql::RawText(text.clone())),
                TemplatePart::Field => {
                    rendered.push(sql::ast::RawSql::Expression(field.clone()));
                }
                TemplatePart::Value => match (values.len(), value(0)) {
                    (1, Some(value)) => rendered.push(value),
                    (found, _) => Err(Error::ValueCountMismatch {
                        column: column.to_string(),
                        found,
                    })?,
                },
                TemplatePart::Value1 => rendered.push(pair(0)?),
                TemplatePart::Value2 => rendered.push(pair(1)?),
                TemplatePart::Values => {
                    for (index, value) in values.iter().enumerate() {
                        if index > 0 {
                            rendered.push(sql::ast::RawSql::RawText(", ".to_string()));
                        }
                        rendered.push(sql::ast::RawSql::Expression(
                            sql::ast::Expression::Value(value.clone()),
                        ));
                    }
                }
            }
        }
        Ok(sql::ast::Expression::RawSql(rendered))
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

fn push_text(parts: &mut Vec<TemplatePart>, text: &str) {
    if !text.is_empty() {
        parts.push(TemplatePart::Text(text.to_string()));
    }
}
