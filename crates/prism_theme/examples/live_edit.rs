//! Minimal end-to-end session: documents in, CSS variables out.
//!
//! Run with: `RUST_LOG=prism_theme=debug cargo run -p prism_theme --example live_edit`

use prism_core::Value;
use prism_theme::{DocumentSet, MemoryStore, Overrides, StyleStore};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tokens = json!({
        "size": { "none": 0, "0.5x": 2, "default": 4, "1x": 8, "md": 16 },
        "color": { "gray": { "900": "#10131a" }, "white": "#ffffff" },
        "opacity": { "shadow": 0.35 }
    });
    let brand = json!({
        "themes": { "light": {
            "palettes": { "core": { "interactive": "{tokens.color.gray.900}" } },
            "layers": { "layer-1": { "properties": {
                "padding": "{tokens.size.md}",
                "surface": "{tokens.color.white}"
            } } }
        } }
    });
    let mapping = json!({
        "button": {
            "background": "{brand.themes.light.palettes.core.interactive}",
            "padding": "{tokens.size.md}"
        }
    });

    let overrides = Overrides::with_backend(Box::new(MemoryStore::new()));
    let mut store = StyleStore::new(DocumentSet::new(tokens, brand, mapping), overrides);

    println!("initial projection:\n{}", store.variables().css_declarations());

    let subscription = store.subscribe(|change| {
        println!("changed: {:?}", change.changed_variable_names);
    });

    store.set_override("size/md", Value::Number(24.0));
    store.set_override("color/white", Value::Text("#101318".to_string()));
    store.clear_override("size/md");

    store.unsubscribe(subscription);
    println!("\nfinal projection:\n{}", store.variables().css_declarations());
}
