//! Built-in verification scenario for the saved-search flow: search for a
//! term, save the search under a label, and confirm the label appears.

use crate::script::{LocatorSpec, Script, Step};

pub fn saved_search(target_url: &str) -> Script {
    Script {
        name: "saved-search".to_string(),
        steps: vec![
            Step::Navigate {
                url: target_url.to_string(),
            },
            Step::Fill {
                locator: LocatorSpec::placeholder("Search Pokemon"),
                text: "water&shiny".to_string(),
                timeout_ms: None,
            },
            Step::PressKey {
                key: "Enter".to_string(),
                locator: None,
                timeout_ms: None,
            },
            Step::Click {
                locator: LocatorSpec::title("Saved Searches"),
                timeout_ms: None,
            },
            Step::Fill {
                locator: LocatorSpec::placeholder("Label"),
                text: "Shiny Water".to_string(),
                timeout_ms: None,
            },
            Step::Click {
                locator: LocatorSpec::role_and_name("button", "Save").exact(),
                timeout_ms: None,
            },
            Step::WaitForText {
                text: "Shiny Water".to_string(),
                timeout_ms: Some(10_000),
            },
        ],
    }
}
