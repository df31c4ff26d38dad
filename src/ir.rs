use crate::util::intern::Interned;

/// A virtual register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Temporary(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Immediate(i64),
    Temporary(Temporary),
    /// Address relative to the frame pointer.
    FrameSlot(i32),
    Label(Interned),
}

impl From<Temporary> for Operand {
    fn from(value: Temporary) -> Self {
        Operand::Temporary(value)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop,
    Multiply,
    Divide,
    Mod,
    Add,
    Subtract,
    LoadImmediate,
    Copy,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    Xor,
    BitAnd,
    BitOr,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    LogicalNot,
    BitNot,
    Negate,
    Positive,
    LoadByte,
    LoadByteUnsigned,
    LoadHalfWord,
    LoadHalfWordUnsigned,
    LoadWord,
    AddressOf,
    StoreByte,
    StoreHalfWord,
    StoreWord,
    ByteToHalfWord,
    ByteToWord,
    HalfWordToByte,
    HalfWordToWord,
    WordToByte,
    WordToHalfWord,
    Parameter,
    Call,
    ResultByte,
    ResultWord,
    Label,
    Goto,
    GotoIfFalse,
    GotoIfTrue,
    Return,
    ReturnVoid,
    ProcBegin,
    ProcEnd,
    AddUnsigned,
    SubtractUnsigned,
    MultiplyUnsigned,
    DivideUnsigned,
    ModUnsigned,
    LessUnsigned,
    LessEqualUnsigned,
    GreaterUnsigned,
    GreaterEqualUnsigned,
    /// Narrowing to an unsigned type zero-extends what's left.
    HalfWordToByteUnsigned,
    WordToByteUnsigned,
    WordToHalfWordUnsigned,
    /// Statement boundary. Carries the next unused temporary id.
    SequencePoint,
}

impl Opcode {
    /// Name used in IR listings.
    pub const fn name(self) -> &'static str {
        use Opcode::*;
        match self {
            Nop => "NOP",
            Multiply => "MULT",
            Divide => "DIV",
            Mod => "MOD",
            Add => "ADD",
            Subtract => "SUB",
            LoadImmediate => "LI",
            Copy => "COPY",
            ShiftLeft => "SHFT_L",
            ShiftRight => "SHFT_R",
            ShiftRightUnsigned => "SHFT_RU",
            Xor => "XOR",
            BitAnd => "BIT_AND",
            BitOr => "BIT_OR",
            Less => "LESS",
            LessEqual => "LESS_EQL",
            Greater => "GRTR",
            GreaterEqual => "GRTR_EQL",
            Equal => "EQL",
            NotEqual => "NOT_EQL",
            LogicalNot => "LOG_NOT",
            BitNot => "BIT_NOT",
            Negate => "MK_NEG",
            Positive => "MK_POS",
            LoadByte => "LB",
            LoadByteUnsigned => "LBU",
            LoadHalfWord => "LHW",
            LoadHalfWordUnsigned => "LHWU",
            LoadWord => "LW",
            AddressOf => "ADDR",
            StoreByte => "ST_B",
            StoreHalfWord => "ST_HW",
            StoreWord => "ST_W",
            ByteToHalfWord => "B->HW",
            ByteToWord => "B->W",
            HalfWordToByte => "HW->B",
            HalfWordToWord => "HW->W",
            WordToByte => "W->B",
            WordToHalfWord => "W->HW",
            Parameter => "PARAM",
            Call => "FUNC_CALL",
            ResultByte => "RES_B",
            ResultWord => "RES_W",
            Label => "LBL",
            Goto => "GOTO",
            GotoIfFalse => "GOTO_F",
            GotoIfTrue => "GOTO_T",
            Return => "RTRN",
            ReturnVoid => "RTRN_0",
            ProcBegin => "PROC_B",
            ProcEnd => "PROC_E",
            AddUnsigned => "ADDU",
            SubtractUnsigned => "SUBU",
            MultiplyUnsigned => "MULU",
            DivideUnsigned => "DIVU",
            ModUnsigned => "MODU",
            LessUnsigned => "LESS_U",
            LessEqualUnsigned => "LESS_EQL_U",
            GreaterUnsigned => "GRTR_U",
            GreaterEqualUnsigned => "GRTR_EQL_U",
            HalfWordToByteUnsigned => "HW->BU",
            WordToByteUnsigned => "W->BU",
            WordToHalfWordUnsigned => "W->HWU",
            SequencePoint => "SEQ",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    operands: [Option<Operand>; 3],
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: &[Operand]) -> Instruction {
        assert!(operands.len() <= 3, "{} takes at most 3 operands", opcode.name());
        let mut slots = [None; 3];
        for (slot, operand) in slots.iter_mut().zip(operands) {
            *slot = Some(*operand);
        }
        Instruction {
            opcode,
            operands: slots,
        }
    }

    /// Returns the `i`-th operand. Panics if the instruction has no such
    /// operand, which means the generator built it wrong.
    pub fn operand(&self, i: usize) -> Operand {
        match self.operands[i] {
            Some(operand) => operand,
            None => panic!("{} has no operand {i}", self.opcode.name()),
        }
    }

    pub fn operands(&self) -> impl Iterator<Item = Operand> + '_ {
        self.operands.iter().map_while(|operand| *operand)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstrId(u32);

impl InstrId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct Node {
    instruction: Instruction,
    prev: Option<InstrId>,
    next: Option<InstrId>,
}

/// A contiguous run of linked instructions within an [`Arena`].
///
/// Sections are consumed when spliced, so a section that has been
/// concatenated away can't be used again.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Section {
    span: Option<(InstrId, InstrId)>,
}

impl Section {
    pub const fn empty() -> Section {
        Section { span: None }
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_none()
    }

    pub fn first(&self) -> Option<InstrId> {
        self.span.map(|(first, _)| first)
    }

    pub fn last(&self) -> Option<InstrId> {
        self.span.map(|(_, last)| last)
    }
}

/// Owns every instruction of a compilation.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn with_capacity(capacity: usize) -> Arena {
        Arena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a section holding just `instruction`.
    pub fn single(&mut self, instruction: Instruction) -> Section {
        let id = InstrId(u32::try_from(self.nodes.len()).expect("too many instructions"));
        self.nodes.push(Node {
            instruction,
            prev: None,
            next: None,
        });
        Section {
            span: Some((id, id)),
        }
    }

    pub fn append(&mut self, section: Section, instruction: Instruction) -> Section {
        let tail = self.single(instruction);
        self.concatenate(section, tail)
    }

    /// Links `before` to `after`, producing the section spanning both.
    pub fn concatenate(&mut self, before: Section, after: Section) -> Section {
        match (before.span, after.span) {
            (None, _) => after,
            (_, None) => before,
            (Some((first, last)), Some((after_first, after_last))) => {
                debug_assert!(self.nodes[last.index()].next.is_none());
                debug_assert!(self.nodes[after_first.index()].prev.is_none());
                self.nodes[last.index()].next = Some(after_first);
                self.nodes[after_first.index()].prev = Some(last);
                Section {
                    span: Some((first, after_last)),
                }
            }
        }
    }

    pub fn get(&self, id: InstrId) -> &Instruction {
        &self.nodes[id.index()].instruction
    }

    pub fn prev(&self, id: InstrId) -> Option<InstrId> {
        self.nodes[id.index()].prev
    }

    pub fn iter<'a>(&'a self, section: &Section) -> Iter<'a> {
        Iter {
            arena: self,
            next: section.first(),
            last: section.last(),
        }
    }
}

pub struct Iter<'a> {
    arena: &'a Arena,
    next: Option<InstrId>,
    last: Option<InstrId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = if Some(id) == self.last {
            None
        } else {
            self.arena.nodes[id.index()].next
        };
        Some(self.arena.get(id))
    }
}

/// The lowered program: every instruction, and the section holding them in
/// program order.
#[derive(Debug)]
pub struct Program {
    pub arena: Arena,
    pub body: Section,
}

impl Program {
    pub fn instructions(&self) -> Iter<'_> {
        self.arena.iter(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn li(arena: &mut Arena, dest: u32, value: i64) -> Section {
        arena.single(Instruction::new(
            Opcode::LoadImmediate,
            &[Temporary(dest).into(), Operand::Immediate(value)],
        ))
    }

    fn values(arena: &Arena, section: &Section) -> Vec<i64> {
        arena
            .iter(section)
            .map(|instr| match instr.operand(1) {
                Operand::Immediate(n) => n,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn concatenation_preserves_order() {
        let mut arena = Arena::default();
        let a = li(&mut arena, 0, 1);
        let a = arena.append(
            a,
            Instruction::new(
                Opcode::LoadImmediate,
                &[Temporary(1).into(), Operand::Immediate(2)],
            ),
        );
        let b = li(&mut arena, 2, 3);
        let c = li(&mut arena, 3, 4);
        let bc = arena.concatenate(b, c);
        let all = arena.concatenate(a, bc);

        assert_eq!(values(&arena, &all), [1, 2, 3, 4]);
        let last = all.last().unwrap();
        assert_eq!(arena.get(arena.prev(last).unwrap()).operand(1), Operand::Immediate(3));
    }

    #[test]
    fn empty_sections_are_identity() {
        let mut arena = Arena::default();
        let a = li(&mut arena, 0, 7);
        let a = arena.concatenate(Section::empty(), a);
        let a = arena.concatenate(a, Section::empty());
        assert_eq!(values(&arena, &a), [7]);
        assert!(arena.iter(&Section::empty()).next().is_none());
    }

    #[test]
    fn iteration_stops_at_section_end() {
        let mut arena = Arena::default();
        let a = li(&mut arena, 0, 1);
        let b = li(&mut arena, 1, 2);
        let b_first = b.first();
        let ab = arena.concatenate(a, b);
        // A section covering only the head of a longer run.
        let head = Section {
            span: Some((ab.first().unwrap(), ab.first().unwrap())),
        };
        assert_eq!(values(&arena, &head), [1]);
        assert_eq!(ab.last(), b_first);
    }

    #[test]
    fn operands_are_positional() {
        let instr = Instruction::new(
            Opcode::Add,
            &[
                Temporary(2).into(),
                Temporary(0).into(),
                Temporary(1).into(),
            ],
        );
        assert_eq!(instr.operands().count(), 3);
        assert_eq!(instr.operand(0), Operand::Temporary(Temporary(2)));
        let nop = Instruction::new(Opcode::Nop, &[]);
        assert_eq!(nop.operands().count(), 0);
    }
}
