//! Minimal counter — the "hello world" of foldstore.

use foldstore::{listener, Action, ReduceError, Store};
use std::rc::Rc;

fn counter(state: Option<&Rc<i64>>, action: Option<&Action>) -> Result<Rc<i64>, ReduceError> {
    let Some(state) = state else {
        return Ok(Rc::new(0));
    };
    match action.map(|a| a.kind.as_str()) {
        Some("INC") => Ok(Rc::new(**state + 1)),
        Some("DEC") => Ok(Rc::new(**state - 1)),
        _ => Ok(Rc::clone(state)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::create(counter)?;

    let unsubscribe = store.subscribe(listener::<i64, _>(|old, new| {
        println!("{} -> {}", old.map_or(0, |o| **o), new);
        Ok(())
    }));

    for kind in ["INC", "INC", "DEC", "DEC", "UNKNOWN"] {
        let outcome = store.dispatch(&Action::kind(kind))?;
        if !outcome.changed {
            println!("{kind}: unchanged");
        }
    }

    unsubscribe.unsubscribe();
    store.dispatch(&Action::kind("INC"))?;

    if let Some(state) = store.state() {
        println!("\nFinal count: {state}");
    }
    Ok(())
}
