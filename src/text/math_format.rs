//! Final-response cleanup: collapses LaTeX-like math markup into plain
//! Unicode and strips Markdown emphasis, so non-streamed answers render
//! without a formula engine on the client.

/// LaTeX control sequences rewritten to their Unicode equivalents when
/// the text carries `$`-delimited math.
const MATH_SYMBOLS: [(&str, &str); 11] = [
    ("\\sum", "∑"),
    ("\\times", "×"),
    ("\\div", "÷"),
    ("\\pm", "±"),
    ("_i", "ᵢ"),
    ("^T", "ᵀ"),
    ("^{-1}", "⁻¹"),
    ("_1", "₁"),
    ("_2", "₂"),
    ("_3", "₃"),
    ("_n", "ₙ"),
];

/// Pure and idempotent: the delimiters that trigger each rewrite are
/// fully removed on the first pass.
pub fn normalize(text: &str) -> String {
    let mut text = text.to_string();

    if text.contains('$') {
        for (symbol, replacement) in MATH_SYMBOLS {
            text = text.replace(symbol, replacement);
        }
        text = text.replace("$$", "").replace('$', "");
    }

    text = text.replace("**", "").replace('*', "");
    text.replace('`', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_math_symbols_inside_dollar_math() {
        let input = "$\\sum_i x_i \\times y$";
        assert_eq!(normalize(input), "∑ᵢ xᵢ × y");
    }

    #[test]
    fn leaves_control_sequences_alone_without_delimiters() {
        let input = "use \\times for multiplication";
        assert_eq!(normalize(input), "use \\times for multiplication");
    }

    #[test]
    fn strips_emphasis_and_code_markers_unconditionally() {
        assert_eq!(normalize("**bold** and *italic* and `code`"), "bold and italic and code");
    }

    #[test]
    fn mass_energy_example() {
        let input = "质量公式是 $m = \\frac{E}{c^{-1}}$ **重要**";
        assert_eq!(normalize(input), "质量公式是 m = \\frac{E}{c⁻¹} 重要");
    }

    #[test]
    fn double_dollar_blocks_are_removed() {
        assert_eq!(normalize("$$a \\pm b$$"), "a ± b");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "$\\sum_1^T$",
            "plain text",
            "**bold $x_2$**",
            "质量公式是 $m = \\frac{E}{c^{-1}}$ **重要**",
            "`tick` * stray",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }
}
