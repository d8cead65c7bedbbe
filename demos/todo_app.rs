//! Todo list with two slices combined into one typed state.

use foldstore::{combine, listener, Action, ReduceError, Slice, SliceAccess, Slices, Store};
use serde_json::json;
use std::rc::Rc;

#[derive(Clone)]
struct Todo {
    id: u64,
    text: String,
    done: bool,
}

struct TodoApp {
    todos: Rc<Vec<Todo>>,
    filter: Rc<String>,
}

impl SliceAccess for TodoApp {
    fn slice(&self, name: &str) -> Option<Slice> {
        match name {
            "todos" => Some(self.todos.clone()),
            "filter" => Some(self.filter.clone()),
            _ => None,
        }
    }
}

fn todos(state: Option<&Rc<Vec<Todo>>>, action: Option<&Action>) -> Result<Rc<Vec<Todo>>, ReduceError> {
    let Some(state) = state else {
        return Ok(Rc::new(Vec::new()));
    };
    let Some(action) = action else {
        return Ok(Rc::clone(state));
    };
    match action.kind.as_str() {
        "todo_added" => {
            let text = action.payload["text"].as_str().unwrap_or("").to_string();
            let mut next = Vec::clone(state);
            next.push(Todo {
                id: state.len() as u64,
                text,
                done: false,
            });
            Ok(Rc::new(next))
        }
        "todo_toggled" => {
            let id = action.payload["id"].as_u64().unwrap_or(0);
            let next = state
                .iter()
                .map(|t| Todo {
                    done: t.done != (t.id == id),
                    ..t.clone()
                })
                .collect();
            Ok(Rc::new(next))
        }
        _ => Ok(Rc::clone(state)),
    }
}

fn filter(state: Option<&Rc<String>>, action: Option<&Action>) -> Result<Rc<String>, ReduceError> {
    match (state, action) {
        (None, _) => Ok(Rc::new("all".to_string())),
        (_, Some(a)) if a.is("filter_set") => {
            Ok(Rc::new(a.payload.as_str().unwrap_or("all").to_string()))
        }
        (Some(s), _) => Ok(Rc::clone(s)),
    }
}

fn build(slices: Slices) -> Result<TodoApp, ReduceError> {
    Ok(TodoApp {
        todos: slices.require("todos")?,
        filter: slices.require("filter")?,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = combine()
        .slice("todos", todos)
        .slice("filter", filter)
        .build_with(build);
    let store = Store::create(app)?;

    store.subscribe(listener::<TodoApp, _>(|_, new| {
        println!("{} todos, filter = {}", new.todos.len(), new.filter);
        Ok(())
    }));

    store.dispatch(&Action::new("todo_added", json!({"text": "buy milk"})))?;
    store.dispatch(&Action::new("todo_added", json!({"text": "write docs"})))?;
    store.dispatch(&Action::new("todo_toggled", json!({"id": 0})))?;
    store.dispatch(&Action::new("filter_set", json!("done")))?;

    let Some(state) = store.state() else {
        return Ok(());
    };
    println!("\nTodos:");
    for item in state.todos.iter() {
        let check = if item.done { "x" } else { " " };
        println!("  [{}] {}", check, item.text);
    }
    Ok(())
}
