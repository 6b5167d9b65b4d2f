#![cfg(target_arch = "wasm32")]

use basket_core::BasketOptimizer;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

const CATALOG: &str = r#"{"Sol Ring": [{"seller": "A", "price": 1.0, "shipping_price": 5.0, "amount": 3}]}"#;

#[wasm_bindgen_test]
fn optimize_with_default_config() {
    let optimizer = BasketOptimizer::new(CATALOG, None).ok().unwrap();
    assert_eq!(optimizer.item_count(), 1);
    assert_eq!(optimizer.seller_count(), 1);

    let plan = optimizer.optimize("1 Sol Ring", JsValue::UNDEFINED).ok().unwrap();
    assert_eq!(plan.summary.total, 6.0);
    assert_eq!(plan.items[0].fragments[0].price_per_unit, 6.0);
}

#[wasm_bindgen_test]
fn rejects_zero_quantity() {
    let optimizer = BasketOptimizer::new(CATALOG, None).ok().unwrap();
    assert!(optimizer.optimize("0 Sol Ring", JsValue::UNDEFINED).is_err());
}

#[wasm_bindgen_test]
fn rejects_malformed_catalog() {
    assert!(BasketOptimizer::new("{\"x\": [{}]}", None).is_err());
}
