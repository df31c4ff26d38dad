use crate::{types::Type, util::intern::Interned};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where an object lives at run time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Storage {
    /// Byte offset from the frame pointer.
    Frame(i32),
    /// File-scope object, addressed through its data label.
    Global,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: Interned,
    pub ty: Type,
    pub storage: Option<Storage>,
    pub scope: ScopeId,
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    /// In declaration order; lookups walk it backwards.
    symbols: Vec<SymbolId>,
    children: Vec<ScopeId>,
}

/// Tree of scopes. Scopes and symbols live until the table is dropped and are
/// referred to by id.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::with_capacity(64)
    }
}

impl SymbolTable {
    /// The file scope, which every table starts with.
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn with_capacity(capacity: usize) -> SymbolTable {
        let mut scopes = Vec::with_capacity(capacity / 4 + 1);
        scopes.push(Scope {
            parent: None,
            symbols: Vec::new(),
            children: Vec::new(),
        });
        SymbolTable {
            scopes,
            symbols: Vec::with_capacity(capacity),
        }
    }

    /// Looks `name` up among ordinary identifiers. Declarations only see the
    /// given scope, uses also see every enclosing one.
    pub fn lookup(&self, scope: ScopeId, name: Interned, is_declaration: bool) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(scope) = current {
            let found = self.scopes[scope.index()]
                .symbols
                .iter()
                .rev()
                .copied()
                .find(|&id| {
                    let symbol = self.symbol(id);
                    symbol.name == name && symbol.ty != Type::Label
                });
            if found.is_some() {
                return found;
            }
            if is_declaration {
                return None;
            }
            current = self.scopes[scope.index()].parent;
        }
        None
    }

    /// Labels have their own namespace, and are only visible in the scope
    /// they were declared in.
    pub fn lookup_label(&self, scope: ScopeId, name: Interned) -> Option<SymbolId> {
        self.scopes[scope.index()]
            .symbols
            .iter()
            .rev()
            .copied()
            .find(|&id| {
                let symbol = self.symbol(id);
                symbol.name == name && symbol.ty == Type::Label
            })
    }

    pub fn declare(&mut self, scope: ScopeId, name: Interned, ty: Type) -> SymbolId {
        let id = SymbolId(u32::try_from(self.symbols.len()).expect("too many symbols"));
        self.symbols.push(Symbol {
            name,
            ty,
            storage: None,
            scope,
        });
        self.scopes[scope.index()].symbols.push(id);
        id
    }

    pub fn new_child_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).expect("too many scopes"));
        self.scopes.push(Scope {
            parent: Some(parent),
            symbols: Vec::new(),
            children: Vec::new(),
        });
        self.scopes[parent.index()].children.push(id);
        id
    }

    /// Places every unplaced object of `scope` in the frame, in declaration
    /// order, starting at `base_offset`. Each child scope then starts from the
    /// same running offset, so sibling blocks share their storage.
    ///
    /// Returns the highest offset reached by the scope or any descendant.
    pub fn assign_frame_offsets(&mut self, scope: ScopeId, base_offset: i32) -> i32 {
        let mut offset = base_offset;
        for i in 0..self.scopes[scope.index()].symbols.len() {
            let id = self.scopes[scope.index()].symbols[i];
            let symbol = &mut self.symbols[id.index()];
            if symbol.storage.is_some() {
                continue;
            }
            let Some(layout) = symbol.ty.layout() else {
                continue;
            };
            offset = align_up(offset, layout.align);
            symbol.storage = Some(Storage::Frame(offset));
            offset += layout.size as i32;
        }

        let mut high_water_mark = offset;
        for i in 0..self.scopes[scope.index()].children.len() {
            let child = self.scopes[scope.index()].children[i];
            high_water_mark = high_water_mark.max(self.assign_frame_offsets(child, offset));
        }
        high_water_mark
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        &self.scopes[scope.index()].children
    }

    /// Symbols of `scope` in declaration order.
    pub fn symbols_in(&self, scope: ScopeId) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.scopes[scope.index()]
            .symbols
            .iter()
            .map(|&id| (id, self.symbol(id)))
    }
}

/// Frame offset of the home slot of the `index`-th parameter. Only the first
/// four parameters have one.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn parameter_offset(index: usize) -> i32 {
    (index * 4) as i32
}

#[expect(clippy::cast_possible_wrap)]
fn align_up(offset: i32, align: u32) -> i32 {
    let align = align.max(1) as i32;
    (offset + align - 1) / align * align
}
