//! Search Orchestrator
//!
//! Runs one exhaustive search on a compute context:
//! 1. Validate the keyspace against the device dispatch limit
//! 2. Build the kernel, allocate and fill the four buffers
//! 3. Dispatch `2^unknown_bits` lanes in one batch and wait
//! 4. Read back the result slot

use std::time::Instant;

use crate::config::SearchConfig;
use crate::engine::device::{work_group_size, ComputeContext, Grid, KernelArgs, MemAccess};
use crate::engine::dispatcher::{select_backend, Backend};
use crate::engine::portable::PortableContext;
use crate::keyspace::Keyspace;
use crate::oracle::{BlockCipherOracle, Des};
use crate::types::{Block, Key, SearchError, SearchRequest, BLOCK_SIZE, KEY_SIZE, NOT_FOUND};

// =============================================================================
// SEARCHER
// =============================================================================

/// Exhaustive key search over one cipher.
#[derive(Debug, Clone, Default)]
pub struct Searcher<O = Des> {
    oracle: O,
    config: SearchConfig,
}

impl Searcher<Des> {
    /// DES searcher with `config`.
    pub const fn new(config: SearchConfig) -> Self {
        Self { oracle: Des, config }
    }
}

impl<O: BlockCipherOracle> Searcher<O> {
    /// Searcher over a custom oracle.
    pub const fn with_oracle(oracle: O, config: SearchConfig) -> Self {
        Self { oracle, config }
    }

    /// The cipher being searched.
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Active configuration.
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Backend the next search will run on.
    ///
    /// # Errors
    /// See [`select_backend`].
    pub fn backend(&self) -> Result<Backend, SearchError> {
        select_backend(self.config.backend, O::DEVICE_KERNEL)
    }

    /// Search on a fresh context of the configured backend.
    ///
    /// The context and every buffer it allocates are released before this
    /// returns.
    ///
    /// # Errors
    /// Any [`SearchError`]; an exhausted keyspace is `Ok(None)`.
    pub fn search(&self, request: &SearchRequest) -> Result<Option<Key>, SearchError> {
        match self.backend()? {
            Backend::Portable => {
                let ctx = PortableContext::new(
                    &self.oracle,
                    self.config.threads,
                    self.config.max_portable_lanes,
                )?;
                self.search_on(&ctx, request)
            }
            Backend::OpenCl => self.search_opencl(request),
        }
    }

    #[cfg(feature = "opencl")]
    fn search_opencl(&self, request: &SearchRequest) -> Result<Option<Key>, SearchError> {
        let entry = O::DEVICE_KERNEL.ok_or(SearchError::BackendUnavailable {
            backend: Backend::OpenCl.name(),
        })?;
        let source = crate::kernels::source::resolve(self.config.kernel_path.as_deref(), entry)?;
        let ctx = crate::engine::opencl::OpenClContext::new(source)?;
        self.search_on(&ctx, request)
    }

    #[cfg(not(feature = "opencl"))]
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    const fn search_opencl(
        &self,
        _request: &SearchRequest,
    ) -> Result<Option<Key>, SearchError> {
        Err(SearchError::BackendUnavailable {
            backend: Backend::OpenCl.name(),
        })
    }

    /// Run the search protocol on `ctx`.
    ///
    /// # Errors
    /// - `KeyspaceTooWide` / `DispatchTooWide` / `PrefixNotCleared` before
    ///   anything is allocated
    /// - `Build` or `Device` from the context
    pub fn search_on<C: ComputeContext>(
        &self,
        ctx: &C,
        request: &SearchRequest,
    ) -> Result<Option<Key>, SearchError> {
        let keyspace = Keyspace::new(request.unknown_bits)?;
        let lanes = keyspace.lanes();
        let limits = ctx.limits();

        if lanes > limits.max_dispatch_width {
            return Err(SearchError::DispatchTooWide {
                lanes,
                max: limits.max_dispatch_width,
            });
        }
        if !keyspace.is_cleared(&request.known_prefix) {
            return Err(SearchError::PrefixNotCleared);
        }

        let grid = Grid {
            lanes,
            group_size: work_group_size(lanes, self.config.group_size, limits.max_group_size),
        };

        let span = tracing::info_span!(
            "search",
            device = ctx.name(),
            lanes,
            group_size = grid.group_size
        );
        let _enter = span.enter();
        let start = Instant::now();

        let program = ctx.build_program()?;

        // 1. Device buffers
        let mut key_buf = ctx.create_buffer(MemAccess::ReadOnly, KEY_SIZE)?;
        let mut plain_buf = ctx.create_buffer(MemAccess::ReadOnly, BLOCK_SIZE)?;
        let mut cipher_buf = ctx.create_buffer(MemAccess::ReadOnly, BLOCK_SIZE)?;
        let mut result_buf = ctx.create_buffer(MemAccess::ReadWrite, KEY_SIZE)?;

        // 2. Upload
        ctx.write_buffer(&mut key_buf, &request.known_prefix)?;
        ctx.write_buffer(&mut plain_buf, &request.plaintext)?;
        ctx.write_buffer(&mut cipher_buf, &request.target)?;
        ctx.write_buffer(&mut result_buf, &NOT_FOUND)?;
        tracing::debug!("inputs uploaded");

        // 3. Dispatch and wait
        let args = KernelArgs {
            key: &key_buf,
            plaintext: &plain_buf,
            target: &cipher_buf,
            result: &mut result_buf,
            unknown_bits: keyspace.bits(),
        };
        let event = ctx.enqueue(&program, args, grid)?;
        ctx.wait(event)?;

        // 4. Download
        let mut slot = NOT_FOUND;
        ctx.read_buffer(&result_buf, &mut slot)?;

        let found = self.interpret_slot(keyspace, request, slot);
        tracing::info!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            found = found.is_some(),
            "search complete"
        );
        Ok(found)
    }

    /// Map the result slot to a search outcome.
    ///
    /// The sentinel is also a real candidate when the prefix is all zero;
    /// that case is settled on the host with the oracle.
    fn interpret_slot(
        &self,
        keyspace: Keyspace,
        request: &SearchRequest,
        slot: Key,
    ) -> Option<Key> {
        if slot != NOT_FOUND {
            return Some(slot);
        }
        let sentinel_matches = keyspace.contains(&request.known_prefix, &NOT_FOUND)
            && self.oracle.encrypt(&NOT_FOUND, &request.plaintext) == request.target;
        sentinel_matches.then_some(NOT_FOUND)
    }
}

// =============================================================================
// ONE-SHOT API
// =============================================================================

/// Recover the unknown low `unknown_bits` bits of a DES key.
///
/// `known_prefix` must have those bits zeroed. Returns `Ok(None)` if no
/// candidate encrypts `plaintext` to `target`.
///
/// # Errors
/// See [`Searcher::search_on`].
///
/// # Example
/// ```rust
/// use keysweep::{BlockCipherOracle, Des, Keyspace};
///
/// let key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
/// let plaintext = *b"keysweep";
/// let target = Des.encrypt(&key, &plaintext);
///
/// let prefix = Keyspace::new(10)?.clear(&key);
/// let found = keysweep::search(&prefix, &plaintext, &target, 10)?;
/// assert_eq!(found.map(|k| Des.normalize_key(&k)), Some(key));
/// # Ok::<(), keysweep::SearchError>(())
/// ```
pub fn search(
    known_prefix: &Key,
    plaintext: &Block,
    target: &Block,
    unknown_bits: u32,
) -> Result<Option<Key>, SearchError> {
    Searcher::new(SearchConfig::default()).search(&SearchRequest::new(
        *known_prefix,
        *plaintext,
        *target,
        unknown_bits,
    ))
}
