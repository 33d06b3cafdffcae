//! The per-device symbol registry.
//!
//! One table exists per target device. It is created on first reference
//! to the device, mutated incrementally while that device's
//! configuration sections are read (pass 1), has addresses fixed and
//! types resolved by the driver (pass 2), and is read-only afterwards.
//! The table is an explicit value passed into every pass, never
//! process-wide state.

use std::collections::{HashMap, HashSet};

use s7gen_dsl::address::{AddressToken, BlockKind, MemoryArea, SizeClass};
use s7gen_dsl::configuration::{IntrinsicSymbol, RawSymbol, SymbolReference, TypeName};
use s7gen_dsl::core::{Id, Located, SourceSpan};
use s7gen_dsl::diagnostic::{Diagnostic, Label};
use s7gen_problems::Problem;

use crate::block::BlockAllocator;
use crate::builtins;
use crate::memory::MemoryAllocator;
use crate::result::PassResult;

/// The resource classes that receive block numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    DataBlock,
    FunctionBlock,
    Function,
    UserType,
    Connection,
    PollIndex,
}

impl From<BlockKind> for ResourceClass {
    fn from(kind: BlockKind) -> Self {
        match kind {
            BlockKind::DataBlock => ResourceClass::DataBlock,
            BlockKind::FunctionBlock => ResourceClass::FunctionBlock,
            BlockKind::Function => ResourceClass::Function,
        }
    }
}

/// Where automatic assignment starts for each resource class and
/// memory area. Device profiles override these to keep generated
/// entities clear of hand-written ones.
#[derive(Debug, Clone)]
pub struct AllocatorSeeds {
    pub data_block: u16,
    pub function_block: u16,
    pub function: u16,
    pub user_type: u16,
    pub connection: u16,
    pub poll_index: u16,
    /// First byte of automatic assignment in every memory area.
    pub memory_start_byte: u16,
}

impl Default for AllocatorSeeds {
    fn default() -> Self {
        Self {
            data_block: 1,
            function_block: 1,
            function: 1,
            user_type: 1,
            connection: 1,
            poll_index: 0,
            memory_start_byte: 0,
        }
    }
}

/// The block-kind/number pair a declared type resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    /// The kind mnemonic (`DB`, `FB`, `FC`) or a primitive type name.
    pub kind: String,
    /// The block number. Primitive types have none.
    pub number: Option<u16>,
}

/// A named entity with an assigned hardware identifier.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: Id,
    /// The address. After pass 2 this carries no automatic markers.
    pub address: AddressToken,
    pub declared_type: Option<TypeName>,
    /// Set by pass 2.
    pub resolved_type: Option<ResolvedType>,
    pub comment: Option<String>,
    /// The original raw descriptor, retained for diagnostics.
    pub provenance: RawSymbol,
    builtin: bool,
    overridden: bool,
}

impl Symbol {
    /// The name quoted for embedding in generated source.
    pub fn quoted_name(&self) -> String {
        format!("\"{}\"", self.name.original())
    }

    pub fn block_kind(&self) -> Option<BlockKind> {
        match &self.address {
            AddressToken::Block { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn block_number(&self) -> Option<u16> {
        match &self.address {
            AddressToken::Block { number, .. } => *number,
            _ => None,
        }
    }

    /// The bit index for single-bit memory symbols.
    pub fn bit(&self) -> Option<u8> {
        match &self.address {
            AddressToken::Memory {
                size: SizeClass::Bit,
                address: Some(address),
                ..
            } => Some(address.bit),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }
}

/// One block allocator per resource class.
#[derive(Debug)]
struct BlockAllocators {
    data_block: BlockAllocator,
    function_block: BlockAllocator,
    function: BlockAllocator,
    user_type: BlockAllocator,
    connection: BlockAllocator,
    poll_index: BlockAllocator,
}

impl BlockAllocators {
    fn for_class(&mut self, class: ResourceClass) -> &mut BlockAllocator {
        match class {
            ResourceClass::DataBlock => &mut self.data_block,
            ResourceClass::FunctionBlock => &mut self.function_block,
            ResourceClass::Function => &mut self.function,
            ResourceClass::UserType => &mut self.user_type,
            ResourceClass::Connection => &mut self.connection,
            ResourceClass::PollIndex => &mut self.poll_index,
        }
    }
}

/// One memory allocator per addressable area.
#[derive(Debug)]
struct MemoryAllocators {
    flag: MemoryAllocator,
    input: MemoryAllocator,
    output: MemoryAllocator,
    peripheral_input: MemoryAllocator,
    peripheral_output: MemoryAllocator,
}

impl MemoryAllocators {
    fn for_area(&mut self, area: MemoryArea) -> &mut MemoryAllocator {
        match area {
            MemoryArea::Flag => &mut self.flag,
            MemoryArea::Input => &mut self.input,
            MemoryArea::Output => &mut self.output,
            MemoryArea::PeripheralInput => &mut self.peripheral_input,
            MemoryArea::PeripheralOutput => &mut self.peripheral_output,
        }
    }
}

/// The shared dictionary all allocators write into.
///
/// Symbols keep their registration order. Iteration order is an external
/// contract: automatic numbers depend on it, and previously generated
/// projects depend on the numbers staying stable across regenerations of
/// unchanged configuration.
#[derive(Debug)]
pub struct SymbolTable {
    device: Id,
    symbols: Vec<Symbol>,
    index: HashMap<Id, usize>,
    blocks: BlockAllocators,
    memory: MemoryAllocators,
    forward_references: Vec<SymbolReference>,
}

impl SymbolTable {
    pub fn new(device: &Id) -> Self {
        Self::with_seeds(device, AllocatorSeeds::default())
    }

    pub fn with_seeds(device: &Id, seeds: AllocatorSeeds) -> Self {
        let mut table = Self {
            device: device.clone(),
            symbols: vec![],
            index: HashMap::new(),
            blocks: BlockAllocators {
                data_block: BlockAllocator::new(seeds.data_block),
                function_block: BlockAllocator::new(seeds.function_block),
                function: BlockAllocator::new(seeds.function),
                user_type: BlockAllocator::new(seeds.user_type),
                connection: BlockAllocator::new(seeds.connection),
                poll_index: BlockAllocator::new(seeds.poll_index),
            },
            memory: MemoryAllocators {
                flag: MemoryAllocator::new(seeds.memory_start_byte),
                input: MemoryAllocator::new(seeds.memory_start_byte),
                output: MemoryAllocator::new(seeds.memory_start_byte),
                peripheral_input: MemoryAllocator::new(seeds.memory_start_byte),
                peripheral_output: MemoryAllocator::new(seeds.memory_start_byte),
            },
            forward_references: vec![],
        };
        table.seed_reserved_symbols();
        table
    }

    /// Seeds the reserved entries with placeholder addresses. The
    /// reserved table is a compile-time constant so parsing it cannot
    /// fail at runtime.
    fn seed_reserved_symbols(&mut self) {
        for reserved in builtins::RESERVED_SYMBOLS {
            let name = Id::from(reserved.name).with_position(SourceSpan::builtin());
            let token = AddressToken::parse(reserved.address, &SourceSpan::builtin())
                .expect("reserved symbol table is valid");
            let declared_type = reserved
                .data_type
                .map(TypeName::from)
                .or_else(|| infer_type(&token, &name));
            let mut descriptor = IntrinsicSymbol::new(reserved.name, reserved.address)
                .with_comment(reserved.comment)
                .with_span(SourceSpan::builtin());
            if let Some(data_type) = &declared_type {
                descriptor = descriptor.with_type(data_type.clone());
            }
            self.index.insert(name.clone(), self.symbols.len());
            self.symbols.push(Symbol {
                name,
                address: token,
                declared_type,
                resolved_type: None,
                comment: Some(reserved.comment.to_string()),
                provenance: RawSymbol::Intrinsic(descriptor),
                builtin: true,
                overridden: false,
            });
        }
    }

    /// Registers one raw descriptor (pass 1).
    ///
    /// Names are locked at first sight. Explicitly given addresses are
    /// not yet reserved against the allocators; only duplicate-name
    /// checking happens here.
    pub fn register(&mut self, raw: &RawSymbol, default_type: Option<&TypeName>) -> PassResult {
        match raw {
            RawSymbol::Reference(reference) => {
                if !self.index.contains_key(&reference.name) {
                    self.forward_references.push(reference.clone());
                }
                Ok(())
            }
            RawSymbol::Intrinsic(declaration) => {
                let token = AddressToken::parse(&declaration.address, &declaration.span)?;

                if let Some(&position) = self.index.get(&declaration.name) {
                    let existing = &mut self.symbols[position];
                    if existing.builtin && !existing.overridden {
                        // The one-time override of a reserved placeholder.
                        existing.address = token;
                        if let Some(data_type) = &declaration.data_type {
                            existing.declared_type = Some(data_type.clone());
                        }
                        if let Some(comment) = &declaration.comment {
                            existing.comment = Some(comment.clone());
                        }
                        existing.provenance = raw.clone();
                        existing.overridden = true;
                        return Ok(());
                    }
                    return Err(Diagnostic::problem(
                        Problem::SymbolNameInUse,
                        Label::span(declaration.span.clone(), "duplicate declaration"),
                    )
                    .with_secondary(Label::span(
                        existing.provenance.span(),
                        "first declared here",
                    ))
                    .with_context("symbol", declaration.name.original())
                    .with_context("first", &existing.provenance.to_string())
                    .with_context("second", &raw.to_string()));
                }

                let declared_type = declaration
                    .data_type
                    .clone()
                    .or_else(|| default_type.cloned())
                    .or_else(|| infer_type(&token, &declaration.name));
                self.index
                    .insert(declaration.name.clone(), self.symbols.len());
                self.symbols.push(Symbol {
                    name: declaration.name.clone(),
                    address: token,
                    declared_type,
                    resolved_type: None,
                    comment: declaration.comment.clone(),
                    provenance: raw.clone(),
                    builtin: false,
                    overridden: false,
                });
                Ok(())
            }
        }
    }

    /// Fixes every symbol's address (pass 2, first half), in
    /// registration order.
    ///
    /// Block and memory symbols go to their allocators. Symbols whose
    /// token is outside the grammar are only checked for a duplicate
    /// raw address.
    pub(crate) fn assign_addresses(&mut self) -> PassResult {
        let mut raw_addresses: HashSet<String> = HashSet::new();

        for position in 0..self.symbols.len() {
            let span = self.symbols[position].provenance.span();
            match self.symbols[position].address.clone() {
                AddressToken::Block { kind, number } => {
                    let allocator = self.blocks.for_class(ResourceClass::from(kind));
                    let number = allocator.allocate(number, &span)?;
                    self.symbols[position].address = AddressToken::Block {
                        kind,
                        number: Some(number),
                    };
                }
                AddressToken::Memory {
                    area,
                    size,
                    address,
                } => {
                    let allocator = self.memory.for_area(area);
                    let address = allocator.allocate(address, size, &span)?;
                    self.symbols[position].address = AddressToken::Memory {
                        area,
                        size,
                        address: Some(address),
                    };
                }
                AddressToken::Other(raw) => {
                    if !raw.is_empty() && !raw_addresses.insert(raw.clone()) {
                        return Err(Diagnostic::problem(
                            Problem::AddressInUse,
                            Label::span(span, "non-hardware address"),
                        )
                        .with_context("address", &raw));
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolves every symbol's declared type (pass 2, second half).
    ///
    /// Primitive type names resolve immediately. Anything else must name
    /// a registered symbol, whose block kind and number become this
    /// symbol's resolved type.
    pub(crate) fn resolve_types(&mut self) -> PassResult {
        for position in 0..self.symbols.len() {
            let Some(declared) = self.symbols[position].declared_type.clone() else {
                continue;
            };
            let resolved = if builtins::is_primitive_type(&declared.name) {
                Some(ResolvedType {
                    kind: declared.name.original().to_uppercase(),
                    number: None,
                })
            } else {
                match self.index.get(&declared.name) {
                    None => {
                        return Err(Diagnostic::problem(
                            Problem::TypeNotDeclared,
                            Label::span(
                                self.symbols[position].provenance.span(),
                                "declared type",
                            ),
                        )
                        .with_context("type", declared.name.original())
                        .with_context("symbol", self.symbols[position].name.original()));
                    }
                    Some(&target) => match &self.symbols[target].address {
                        AddressToken::Block { kind, number } => Some(ResolvedType {
                            kind: kind.mnemonic().to_string(),
                            number: *number,
                        }),
                        // The referenced symbol has no block identity of
                        // its own; inherit whatever it resolved to.
                        _ => self.symbols[target].resolved_type.clone(),
                    },
                }
            };
            self.symbols[position].resolved_type = resolved;
        }

        for reference in &self.forward_references {
            if !self.index.contains_key(&reference.name) {
                return Err(Diagnostic::problem(
                    Problem::TypeNotDeclared,
                    Label::span(reference.span.clone(), "forward reference"),
                )
                .with_context("symbol", reference.name.original()));
            }
        }
        Ok(())
    }

    /// Allocates a number from a resource class with no address-token
    /// grammar (connection ids, poll indexes, user types). Feature
    /// generators call this directly.
    pub fn allocate_number(
        &mut self,
        class: ResourceClass,
        explicit: Option<u16>,
        span: &SourceSpan,
    ) -> Result<u16, Diagnostic> {
        self.blocks.for_class(class).allocate(explicit, span)
    }

    pub fn device(&self) -> &Id {
        &self.device
    }

    /// All symbols in registration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, name: &Id) -> Option<&Symbol> {
        self.index.get(name).map(|&position| &self.symbols[position])
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// The default type when a declaration carries none.
///
/// Blocks are their own type. Memory operands default from their width.
fn infer_type(token: &AddressToken, name: &Id) -> Option<TypeName> {
    match token {
        AddressToken::Block { .. } => Some(TypeName::from_id(name)),
        AddressToken::Memory { size, .. } => match size {
            SizeClass::Bit => Some(TypeName::from("BOOL")),
            SizeClass::Byte => Some(TypeName::from("BYTE")),
            SizeClass::Word => Some(TypeName::from("WORD")),
            SizeClass::DoubleWord => Some(TypeName::from("DWORD")),
        },
        AddressToken::Other(_) => None,
    }
}
