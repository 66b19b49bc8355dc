#![forbid(unsafe_code)]

//! Source buffers: the three independently edited fragments and the tab that
//! routes the single editing surface to one of them.

use serde::{Deserialize, Serialize};

const DEFAULT_MARKUP: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Preview</title>
</head>
<body>
  <h1>Hello World!</h1>
  <p>Welcome to the Online Code Editor</p>
  <div class="container">
    <button class="btn">Click me!</button>
  </div>
</body>
</html>"#;

const DEFAULT_STYLE: &str = r#"body {
  font-family: Arial, sans-serif;
  margin: 20px;
  background-color: #f5f5f5;
}

.container {
  display: flex;
  justify-content: center;
  margin-top: 20px;
}

.btn {
  padding: 10px 20px;
  background-color: #61dafb;
  color: white;
  border: none;
  border-radius: 4px;
  cursor: pointer;
  transition: all 0.3s ease;
}

.btn:hover {
  background-color: #764abc;
  transform: scale(1.05);
}"#;

const DEFAULT_SCRIPT: &str = r#"document.querySelector('.btn').addEventListener('click', () => {
  alert('Button clicked!');
});"#;

/// The document-in-progress. Fields are free-form and never validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSet {
    pub markup: String,
    pub style: String,
    pub script: String,
}

impl Default for SourceSet {
    fn default() -> Self {
        Self::new(DEFAULT_MARKUP, DEFAULT_STYLE, DEFAULT_SCRIPT)
    }
}

impl SourceSet {
    pub fn new(
        markup: impl Into<String>,
        style: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            markup: markup.into(),
            style: style.into(),
            script: script.into(),
        }
    }

    /// Read the buffer selected by `tab`.
    #[must_use]
    pub fn get(&self, tab: ActiveTab) -> &str {
        (tab.accessor().read)(self)
    }

    /// Replace the buffer selected by `tab`.
    pub fn set(&mut self, tab: ActiveTab, text: String) {
        *(tab.accessor().write)(self) = text;
    }
}

/// Getter/setter pair for one buffer of a [`SourceSet`].
#[derive(Clone, Copy)]
pub struct BufferAccessor {
    pub read: fn(&SourceSet) -> &str,
    pub write: fn(&mut SourceSet) -> &mut String,
}

fn read_markup(s: &SourceSet) -> &str {
    &s.markup
}

fn write_markup(s: &mut SourceSet) -> &mut String {
    &mut s.markup
}

fn read_style(s: &SourceSet) -> &str {
    &s.style
}

fn write_style(s: &mut SourceSet) -> &mut String {
    &mut s.style
}

fn read_script(s: &SourceSet) -> &str {
    &s.script
}

fn write_script(s: &mut SourceSet) -> &mut String {
    &mut s.script
}

const MARKUP_ACCESSOR: BufferAccessor = BufferAccessor {
    read: read_markup,
    write: write_markup,
};

const STYLE_ACCESSOR: BufferAccessor = BufferAccessor {
    read: read_style,
    write: write_style,
};

const SCRIPT_ACCESSOR: BufferAccessor = BufferAccessor {
    read: read_script,
    write: write_script,
};

/// Which buffer the shared editing surface is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActiveTab {
    #[default]
    Markup,
    Style,
    Script,
}

impl ActiveTab {
    pub const ALL: [Self; 3] = [Self::Markup, Self::Style, Self::Script];

    #[must_use]
    pub const fn accessor(self) -> BufferAccessor {
        match self {
            Self::Markup => MARKUP_ACCESSOR,
            Self::Style => STYLE_ACCESSOR,
            Self::Script => SCRIPT_ACCESSOR,
        }
    }

    /// Tab caption.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Markup => "HTML",
            Self::Style => "CSS",
            Self::Script => "JavaScript",
        }
    }

    /// Language mode handed to the editing surface.
    #[must_use]
    pub const fn language_id(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Style => "css",
            Self::Script => "javascript",
        }
    }

    /// Inverse of [`language_id`](Self::language_id); also accepts `js`.
    #[must_use]
    pub fn from_language_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "html" => Some(Self::Markup),
            "css" => Some(Self::Style),
            "javascript" | "js" => Some(Self::Script),
            _ => None,
        }
    }
}
