//! Static template catalog. Selecting a template replaces the whole
//! [`SourceSet`]; nothing is merged.

use std::sync::OnceLock;

use crate::source::SourceSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub sources: SourceSet,
}

const COUNTER_MARKUP: &str = r#"<div class="counter">
  <h1>Counter</h1>
  <p class="count" id="count">0</p>
  <div class="controls">
    <button id="decrement">-</button>
    <button id="reset">Reset</button>
    <button id="increment">+</button>
  </div>
</div>"#;

const COUNTER_STYLE: &str = r#"body {
  font-family: Arial, sans-serif;
  display: flex;
  justify-content: center;
  margin-top: 40px;
}

.counter {
  text-align: center;
}

.count {
  font-size: 48px;
  margin: 16px 0;
}

.controls button {
  padding: 8px 16px;
  margin: 0 4px;
  font-size: 18px;
  cursor: pointer;
}"#;

const COUNTER_SCRIPT: &str = r#"let count = 0;
const display = document.getElementById('count');

function render() {
  display.textContent = count;
}

document.getElementById('increment').addEventListener('click', () => {
  count += 1;
  render();
});

document.getElementById('decrement').addEventListener('click', () => {
  count -= 1;
  render();
});

document.getElementById('reset').addEventListener('click', () => {
  count = 0;
  render();
});"#;

const TODO_MARKUP: &str = r#"<div class="todo">
  <h1>Todo List</h1>
  <form id="todo-form">
    <input id="todo-input" placeholder="What needs doing?" />
    <button type="submit">Add</button>
  </form>
  <ul id="todo-list"></ul>
</div>"#;

const TODO_STYLE: &str = r#"body {
  font-family: Arial, sans-serif;
  margin: 20px;
}

.todo {
  max-width: 360px;
  margin: 0 auto;
}

#todo-list li {
  padding: 6px 0;
  cursor: pointer;
}

#todo-list li.done {
  text-decoration: line-through;
  color: #888;
}"#;

const TODO_SCRIPT: &str = r#"const form = document.getElementById('todo-form');
const input = document.getElementById('todo-input');
const list = document.getElementById('todo-list');

form.addEventListener('submit', (event) => {
  event.preventDefault();
  const text = input.value.trim();
  if (!text) return;
  const item = document.createElement('li');
  item.textContent = text;
  item.addEventListener('click', () => item.classList.toggle('done'));
  list.appendChild(item);
  input.value = '';
});"#;

/// The catalog, in display order. The first entry is the startup document.
#[must_use]
pub fn templates() -> &'static [Template] {
    static CATALOG: OnceLock<Vec<Template>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            Template {
                name: "Hello World",
                sources: SourceSet::default(),
            },
            Template {
                name: "Counter App",
                sources: SourceSet::new(COUNTER_MARKUP, COUNTER_STYLE, COUNTER_SCRIPT),
            },
            Template {
                name: "Todo List",
                sources: SourceSet::new(TODO_MARKUP, TODO_STYLE, TODO_SCRIPT),
            },
        ]
    })
}

#[must_use]
pub fn find(name: &str) -> Option<&'static Template> {
    templates().iter().find(|t| t.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    templates().iter().map(|t| t.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_and_lookup() {
        assert_eq!(
            names().collect::<Vec<_>>(),
            ["Hello World", "Counter App", "Todo List"]
        );
        assert_eq!(find("Hello World").unwrap().sources, SourceSet::default());
        assert!(find("counter app").is_none());
    }

    #[test]
    fn templates_differ_in_every_field() {
        let hello = &find("Hello World").unwrap().sources;
        let counter = &find("Counter App").unwrap().sources;
        assert_ne!(hello.markup, counter.markup);
        assert_ne!(hello.style, counter.style);
        assert_ne!(hello.script, counter.script);
    }
}
