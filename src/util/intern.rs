use std::{collections::HashMap, fmt, num::NonZeroU32, rc::Rc};

/// Handle to an identifier or label held by an [`Interner`]. Handles from
/// one interner are equal exactly when their names are.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Interned(NonZeroU32);

impl fmt::Debug for Interned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interned({})", self.0)
    }
}

impl From<&Interned> for Interned {
    fn from(value: &Interned) -> Self {
        *value
    }
}

/// Names of one compilation. Handles are 1-based indices into `names`.
pub struct Interner {
    handles: HashMap<Rc<str>, Interned>,
    names: Vec<Rc<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Interner::with_capacity(128)
    }
}

impl Interner {
    pub fn with_capacity(capacity: usize) -> Self {
        Interner {
            handles: HashMap::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn intern(&mut self, name: &str) -> Interned {
        if let Some(&handle) = self.handles.get(name) {
            return handle;
        }
        let handle = u32::try_from(self.names.len() + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Interned)
            .expect("too many interned names");
        let name: Rc<str> = name.into();
        self.names.push(Rc::clone(&name));
        self.handles.insert(name, handle);
        handle
    }

    /// Interns a formatted name without keeping the temporary string around.
    pub fn intern_fmt(&mut self, args: fmt::Arguments<'_>) -> Interned {
        match args.as_str() {
            Some(name) => self.intern(name),
            None => self.intern(&args.to_string()),
        }
    }

    /// Panics if `handle` comes from another interner.
    pub fn get(&self, handle: impl Into<Interned>) -> &str {
        let Interned(index) = handle.into();
        &self.names[index.get() as usize - 1]
    }
}
