//! Page-side JavaScript for finding and inspecting elements.
//!
//! Each strategy compiles to a self-contained expression that evaluates to
//! the first matching element in DOM order, or `null`. Values are embedded
//! as JSON string literals, so arbitrary quotes in locator values are safe.

use crate::script::{LocatorSpec, Strategy};

/// Predicate run on a resolved element to decide whether it is visible.
pub const IS_VISIBLE_FN: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}"#;

/// Reports the viewport-space center of a resolved element.
pub const CENTER_FN: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    return { x: rect.x + rect.width / 2, y: rect.y + rect.height / 2 };
}"#;

pub const FOCUS_FN: &str = "function() { this.focus(); }";

/// Builds the function that writes `text` into a resolved form control.
///
/// The value goes through the native prototype setter: framework-managed
/// inputs (React, Vue) shadow the instance setter and would otherwise not
/// observe the change. The bubbling `input`/`change` pair mirrors what a
/// real keyboard edit produces.
pub fn fill_function(text: &str) -> String {
    let literal = js_string(text);
    format!(
        r#"function() {{
    this.focus();
    const value = {literal};
    const proto = this.tagName === 'TEXTAREA'
        ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
    const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
    setter.call(this, value);
    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
}}"#
    )
}

/// Builds the expression that resolves `locator` to an element or `null`.
pub fn finder_expression(locator: &LocatorSpec) -> String {
    let want = js_string(&locator.value);
    let exact = locator.exact;
    match locator.strategy {
        Strategy::Placeholder => attribute_finder("placeholder", &want, exact),
        Strategy::TitleAttribute => attribute_finder("title", &want, exact),
        Strategy::CssSelector => format!("document.querySelector({})", want),
        Strategy::TextContent => format!(
            r#"(() => {{
    const want = {want};
    const matches = (el) => {{
        const text = (el.textContent || '').trim();
        return {exact} ? text === want : text.includes(want);
    }};
    const walk = (el) => {{
        for (const child of el.children) {{
            const hit = walk(child);
            if (hit) return hit;
        }}
        return matches(el) ? el : null;
    }};
    return document.body ? walk(document.body) : null;
}})()"#
        ),
        Strategy::RoleAndName => {
            let role = js_string(locator.role.as_deref().unwrap_or(""));
            format!(
                r#"(() => {{
    const want = {want};
    const role = {role};
    const hasRole = (el) => {{
        const explicit = el.getAttribute('role');
        if (explicit) return explicit === role;
        const tag = el.tagName.toLowerCase();
        switch (role) {{
            case 'button':
                return tag === 'button' ||
                    (tag === 'input' && ['button', 'submit', 'reset'].includes(el.type));
            case 'link':
                return tag === 'a' && el.hasAttribute('href');
            case 'textbox':
                return tag === 'textarea' ||
                    (tag === 'input' && ['text', 'search', 'email', 'url', 'tel'].includes(el.type));
            case 'checkbox':
                return tag === 'input' && el.type === 'checkbox';
            case 'heading':
                return /^h[1-6]$/.test(tag);
            default:
                return false;
        }}
    }};
    const accessibleName = (el) =>
        (el.getAttribute('aria-label') || el.textContent || el.value || '').trim();
    for (const el of document.querySelectorAll('*')) {{
        if (!hasRole(el)) continue;
        const name = accessibleName(el);
        if ({exact} ? name === want : name.includes(want)) return el;
    }}
    return null;
}})()"#
            )
        }
    }
}

fn attribute_finder(attribute: &str, want_literal: &str, exact: bool) -> String {
    format!(
        r#"(() => {{
    const want = {want_literal};
    for (const el of document.querySelectorAll('[{attribute}]')) {{
        const actual = el.getAttribute('{attribute}') || '';
        if ({exact} ? actual === want : actual.includes(want)) return el;
    }}
    return null;
}})()"#
    )
}

/// Quotes a Rust string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::LocatorSpec;

    #[test]
    fn values_are_embedded_as_json_literals() {
        let locator = LocatorSpec::placeholder(r#"Label (e.g. "My Team")"#);
        let expr = finder_expression(&locator);
        assert!(expr.contains(r#""Label (e.g. \"My Team\")""#));
        assert!(expr.contains("querySelectorAll('[placeholder]')"));
    }

    #[test]
    fn css_strategy_passes_the_selector_through() {
        let expr = finder_expression(&LocatorSpec::css("button.save > span"));
        assert_eq!(expr, r#"document.querySelector("button.save > span")"#);
    }

    #[test]
    fn exact_flag_switches_the_comparison() {
        let partial = finder_expression(&LocatorSpec::placeholder("Search"));
        assert!(partial.contains("false ? actual === want"));
        let exact = finder_expression(&LocatorSpec::placeholder("Search").exact());
        assert!(exact.contains("true ? actual === want"));
    }

    #[test]
    fn role_finder_carries_role_and_name() {
        let expr = finder_expression(&LocatorSpec::role_and_name("button", "Save").exact());
        assert!(expr.contains(r#"const role = "button""#));
        assert!(expr.contains(r#"const want = "Save""#));
        assert!(expr.contains("aria-label"));
    }

    #[test]
    fn text_finder_descends_before_matching() {
        let expr = finder_expression(&LocatorSpec::text("Shiny Water"));
        let walk_at = expr.find("walk(child)").unwrap();
        let self_at = expr.find("matches(el) ? el : null").unwrap();
        assert!(walk_at < self_at, "children must be tried before the element itself");
    }

    #[test]
    fn fill_function_quotes_the_text() {
        let f = fill_function(r#"water&"shiny""#);
        assert!(f.contains(r#"const value = "water&\"shiny\"";"#));
        assert!(f.contains("dispatchEvent(new Event('input'"));
        assert!(f.contains("dispatchEvent(new Event('change'"));
    }
}
