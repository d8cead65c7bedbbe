#![allow(dead_code)]

use foldstore::{listener, Action, Listener, ReduceError, SliceAccess, Slice, Slices};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

pub fn counter(state: Option<&Rc<i64>>, action: Option<&Action>) -> Result<Rc<i64>, ReduceError> {
    let Some(state) = state else {
        return Ok(Rc::new(0));
    };
    match action.map(|a| a.kind.as_str()) {
        Some("INC") => Ok(Rc::new(**state + 1)),
        Some("DEC") => Ok(Rc::new(**state - 1)),
        _ => Ok(Rc::clone(state)),
    }
}

/// Like `counter`, but allocates a new `Rc` even when the value is unchanged.
pub fn rebuilding_counter(
    state: Option<&Rc<i64>>,
    action: Option<&Action>,
) -> Result<Rc<i64>, ReduceError> {
    counter(state, action).map(|next| Rc::new(*next))
}

pub fn failing(state: Option<&Rc<i64>>, action: Option<&Action>) -> Result<Rc<i64>, ReduceError> {
    match action {
        Some(a) if a.is("FAIL") => Err(ReduceError::rejected("refusing FAIL")),
        _ => counter(state, action),
    }
}

pub fn inc() -> Action {
    Action::kind("INC")
}

pub fn dec() -> Action {
    Action::kind("DEC")
}

/// Listener that appends `"old->new; "` to `trace`.
pub fn tracer(trace: Rc<RefCell<String>>) -> Rc<impl Listener<i64>> {
    listener::<i64, _>(move |old, new| {
        let old = old.map_or_else(|| "None".to_string(), |o| o.to_string());
        trace.borrow_mut().push_str(&format!("{old}->{new}; "));
        Ok(())
    })
}

/// Listener that records `name` into `calls` and succeeds.
pub fn recorder(name: &'static str, calls: Rc<RefCell<Vec<&'static str>>>) -> Rc<impl Listener<i64>> {
    listener::<i64, _>(move |_, _| {
        calls.borrow_mut().push(name);
        Ok(())
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

impl Todo {
    pub fn new(id: u64, text: &str, completed: bool) -> Self {
        Todo {
            id,
            text: text.to_string(),
            completed,
        }
    }
}

pub fn add_todo(id: u64, text: &str) -> Action {
    Action::new("ADD_TODO", json!({"id": id, "text": text}))
}

pub fn toggle_todo(id: u64) -> Action {
    Action::new("TOGGLE_TODO", json!({"id": id}))
}

pub fn set_visibility_filter(filter: &str) -> Action {
    Action::new("SET_VISIBILITY_FILTER", json!({"filter": filter}))
}

pub fn todos(
    state: Option<&Rc<Vec<Todo>>>,
    action: Option<&Action>,
) -> Result<Rc<Vec<Todo>>, ReduceError> {
    let Some(state) = state else {
        return Ok(Rc::new(Vec::new()));
    };
    let Some(action) = action else {
        return Ok(Rc::clone(state));
    };
    match action.kind.as_str() {
        "ADD_TODO" => {
            let text = action.payload["text"]
                .as_str()
                .ok_or_else(|| ReduceError::rejected("ADD_TODO without text"))?;
            let id = action.payload["id"].as_u64().unwrap_or(state.len() as u64);
            let mut next = Vec::clone(state);
            next.push(Todo::new(id, text, false));
            Ok(Rc::new(next))
        }
        "TOGGLE_TODO" => {
            let id = action.payload["id"].as_u64().unwrap_or(u64::MAX);
            let next = state
                .iter()
                .map(|todo| {
                    if todo.id == id {
                        Todo {
                            completed: !todo.completed,
                            ..todo.clone()
                        }
                    } else {
                        todo.clone()
                    }
                })
                .collect();
            Ok(Rc::new(next))
        }
        _ => Ok(Rc::clone(state)),
    }
}

pub fn visibility_filter(
    state: Option<&Rc<String>>,
    action: Option<&Action>,
) -> Result<Rc<String>, ReduceError> {
    let Some(state) = state else {
        return Ok(Rc::new("SHOW_ALL".to_string()));
    };
    match action {
        Some(a) if a.is("SET_VISIBILITY_FILTER") => {
            let filter = a.payload["filter"].as_str().unwrap_or("SHOW_ALL");
            Ok(Rc::new(filter.to_string()))
        }
        _ => Ok(Rc::clone(state)),
    }
}

#[derive(Debug, PartialEq)]
pub struct TodoApp {
    pub todos: Rc<Vec<Todo>>,
    pub visibility_filter: Rc<String>,
}

impl SliceAccess for TodoApp {
    fn slice(&self, name: &str) -> Option<Slice> {
        match name {
            "todos" => Some(self.todos.clone()),
            "visibility_filter" => Some(self.visibility_filter.clone()),
            _ => None,
        }
    }
}

pub fn todo_app(slices: Slices) -> Result<TodoApp, ReduceError> {
    Ok(TodoApp {
        todos: slices.require("todos")?,
        visibility_filter: slices.require("visibility_filter")?,
    })
}
