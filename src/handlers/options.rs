//! Rendering and matching of menu options shared by Menu and List screens

use crate::value_objects::MenuOption;

/// A menu option as displayed, with the inputs that select it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderedOption<'a> {
    pub line: String,
    pub keys: Vec<String>,
    pub option: &'a MenuOption,
}

impl RenderedOption<'_> {
    pub fn accepts(&self, input: &str) -> bool {
        self.keys.iter().any(|key| key == input)
    }
}

/// Number options without a symbol from `first_number` onwards.
///
/// Options with a symbol keep it as their prefix and do not consume a number.
/// A numbered option with a value accepts both the displayed number and the
/// value.
pub(crate) fn render_options(options: &[MenuOption], first_number: usize) -> Vec<RenderedOption<'_>> {
    let mut number = first_number;
    options
        .iter()
        .map(|option| match &option.symbol {
            Some(symbol) => RenderedOption {
                line: format!("{} {}", symbol, option.label),
                keys: vec![
                    option
                        .value
                        .clone()
                        .unwrap_or_else(|| symbol.trim().to_string()),
                ],
                option,
            },
            None => {
                let shown = number.to_string();
                let mut keys = vec![shown.clone()];
                keys.extend(option.value.iter().filter(|v| **v != shown).cloned());
                let rendered = RenderedOption {
                    line: format!("{}. {}", number, option.label),
                    keys,
                    option,
                };
                number += 1;
                rendered
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<MenuOption> {
        vec![
            MenuOption::new("Buy shares", "buy_shares"),
            MenuOption::new("Back", "back").with_symbol("*"),
            MenuOption::new("Sell shares", "sell_shares"),
            MenuOption::new("BackTesting", "back_test")
                .with_symbol("a ")
                .with_value("a"),
        ]
    }

    #[test]
    fn test_symbols_do_not_consume_numbers() {
        let options = options();
        let rendered = render_options(&options, 1);
        let lines: Vec<&str> = rendered.iter().map(|r| r.line.as_str()).collect();
        assert_eq!(lines, vec!["1. Buy shares", "* Back", "2. Sell shares", "a  BackTesting"]);

        let keys: Vec<String> = rendered.iter().map(|r| r.keys.join(",")).collect();
        assert_eq!(keys, vec!["1", "*", "2", "a"]);
    }

    #[test]
    fn test_numbered_option_with_value_accepts_both() {
        let options = vec![
            MenuOption::new("Buy", "buy").with_value("b"),
            MenuOption::new("Sell", "sell").with_value("2"),
        ];
        let rendered = render_options(&options, 1);
        assert_eq!(rendered[0].line, "1. Buy");
        assert!(rendered[0].accepts("1"));
        assert!(rendered[0].accepts("b"));
        assert_eq!(rendered[1].keys, vec!["2".to_string()]);
    }

    #[test]
    fn test_numbering_continues_from_offset() {
        let options = options();
        let rendered = render_options(&options, 4);
        assert_eq!(rendered[0].line, "4. Buy shares");
        assert_eq!(rendered[2].line, "5. Sell shares");
    }
}
