//! Demand-driven executive.
//!
//! One `Executive` drives one algorithm. A pull on an output runs four
//! phases, each first forwarded upstream:
//!
//! 1. **data object**: make sure every output holds a data object of the
//!    declared kind,
//! 2. **information**: let the algorithm publish metadata, then reset each
//!    output's request to the whole extent,
//! 3. **update extent**: push the downstream request to every producer,
//! 4. **data**: regenerate outputs whose request is no longer satisfied.
//!
//! Each phase is gated on the pipeline modification time, the newest stamp
//! of this node, its connections and everything upstream of it. A phase
//! whose stamp is at least that recent is skipped.

use crate::config::ExecutiveConfig;
use crate::data::{new_data_object, DataKind, ExtentType, ProducerLink};
use crate::information::{keys, Information, InformationRef};
use crate::pipeline::algorithm::{Algorithm, RequestContext};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::streaming::{self, PieceRequest};
use crate::pipeline::validation;
use crate::time_stamp::TimeStamp;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// The request phases an executive dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    DataObject,
    Information,
    UpdateExtent,
    Data,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::DataObject => "data object",
            Phase::Information => "information",
            Phase::UpdateExtent => "update extent",
            Phase::Data => "data",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One producer output feeding an input port.
#[derive(Clone)]
pub struct Connection {
    producer: Rc<Executive>,
    port: usize,
}

impl Connection {
    pub fn producer(&self) -> &Rc<Executive> {
        &self.producer
    }

    /// Output port of the producer.
    pub fn port(&self) -> usize {
        self.port
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.producer.name(), self.port)
    }
}

/// Clears the in-algorithm marker even if a handler unwinds.
struct AlgorithmGuard<'a>(&'a Cell<Option<Phase>>);

impl Drop for AlgorithmGuard<'_> {
    fn drop(&mut self) {
        self.0.set(None);
    }
}

pub struct Executive {
    name: String,
    this: Weak<Executive>,
    algorithm: RefCell<Box<dyn Algorithm>>,
    config: ExecutiveConfig,
    input_port_information: Vec<Information>,
    output_port_information: Vec<Information>,
    inputs: RefCell<Vec<Vec<Connection>>>,
    outputs: Vec<InformationRef>,
    /// Bumped on every connection change.
    mtime: Cell<TimeStamp>,
    pipeline_mtime: Cell<TimeStamp>,
    data_object_time: Cell<TimeStamp>,
    information_time: Cell<TimeStamp>,
    data_time: Cell<TimeStamp>,
    in_algorithm: Cell<Option<Phase>>,
    continue_executing: Cell<bool>,
    short_circuited: Cell<bool>,
}

impl Executive {
    /// Wrap an algorithm. Port information is filled once, here.
    pub fn new<A: Algorithm>(algorithm: A, config: ExecutiveConfig) -> PipelineResult<Rc<Self>> {
        Self::from_boxed(Box::new(algorithm), config)
    }

    pub fn from_boxed(
        algorithm: Box<dyn Algorithm>,
        config: ExecutiveConfig,
    ) -> PipelineResult<Rc<Self>> {
        let name = algorithm.name().to_string();
        let input_port_information = (0..algorithm.number_of_input_ports())
            .map(|port| {
                let mut info = Information::new();
                algorithm.fill_input_port_information(port, &mut info)?;
                Ok::<_, PipelineError>(info)
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        let output_port_information = (0..algorithm.number_of_output_ports())
            .map(|port| {
                let mut info = Information::new();
                algorithm.fill_output_port_information(port, &mut info)?;
                Ok::<_, PipelineError>(info)
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        let outputs = (0..output_port_information.len())
            .map(|_| {
                let mut info = Information::new();
                info.set(&keys::RELEASE_DATA, config.release_data);
                info.into_ref()
            })
            .collect();
        let inputs = vec![Vec::new(); input_port_information.len()];

        tracing::debug!(
            "Created executive '{}' ({} in, {} out)",
            name,
            input_port_information.len(),
            output_port_information.len()
        );

        Ok(Rc::new_cyclic(|this| Self {
            name,
            this: this.clone(),
            algorithm: RefCell::new(algorithm),
            config,
            input_port_information,
            output_port_information,
            inputs: RefCell::new(inputs),
            outputs,
            mtime: Cell::new(TimeStamp::now()),
            pipeline_mtime: Cell::new(TimeStamp::ZERO),
            data_object_time: Cell::new(TimeStamp::ZERO),
            information_time: Cell::new(TimeStamp::ZERO),
            data_time: Cell::new(TimeStamp::ZERO),
            in_algorithm: Cell::new(None),
            continue_executing: Cell::new(false),
            short_circuited: Cell::new(false),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ExecutiveConfig {
        &self.config
    }

    pub(crate) fn rc(&self) -> Option<Rc<Executive>> {
        self.this.upgrade()
    }

    // ── Algorithm access ──

    /// Typed view of the algorithm. `None` on a type mismatch or while a
    /// handler is running.
    pub fn algorithm<A: Algorithm>(&self) -> Option<Ref<'_, A>> {
        let algorithm = self.algorithm.try_borrow().ok()?;
        Ref::filter_map(algorithm, |a| (**a).as_any().downcast_ref::<A>()).ok()
    }

    /// Typed mutable view, for changing parameters between updates.
    pub fn algorithm_mut<A: Algorithm>(&self) -> Option<RefMut<'_, A>> {
        let algorithm = self.algorithm.try_borrow_mut().ok()?;
        RefMut::filter_map(algorithm, |a| (**a).as_any_mut().downcast_mut::<A>()).ok()
    }

    pub fn number_of_input_ports(&self) -> usize {
        self.input_port_information.len()
    }

    pub fn number_of_output_ports(&self) -> usize {
        self.outputs.len()
    }

    pub fn input_port_information(&self, port: usize) -> Option<&Information> {
        self.input_port_information.get(port)
    }

    pub fn output_port_information(&self, port: usize) -> Option<&Information> {
        self.output_port_information.get(port)
    }

    /// Pipeline information of output `port`, shared with every consumer.
    pub fn output_information(&self, port: usize) -> Option<InformationRef> {
        self.outputs.get(port).cloned()
    }

    pub fn output_data(&self, port: usize) -> Option<crate::data::DataObjectRef> {
        self.outputs.get(port)?.borrow().data_object()
    }

    /// Let consumers discard output `port` once they have executed.
    pub fn set_release_data_flag(&self, port: usize, release: bool) -> PipelineResult<()> {
        self.check_output_port(Some(port), "set_release_data_flag")?;
        self.outputs[port]
            .borrow_mut()
            .set(&keys::RELEASE_DATA, release);
        Ok(())
    }

    pub fn release_data_flag(&self, port: usize) -> bool {
        self.outputs
            .get(port)
            .is_some_and(|info| info.borrow().get_or(&keys::RELEASE_DATA, false))
    }

    // ── Connections ──

    /// Replace every connection on `port` with a single one.
    pub fn set_input_connection(
        &self,
        port: usize,
        producer: &Rc<Executive>,
        producer_port: usize,
    ) -> PipelineResult<()> {
        self.check_connection(port, producer, producer_port)?;
        self.inputs.borrow_mut()[port] = vec![Connection {
            producer: producer.clone(),
            port: producer_port,
        }];
        self.connections_modified();
        tracing::info!(
            "Connected {}:{} -> {}:{}",
            producer.name(),
            producer_port,
            self.name,
            port
        );
        Ok(())
    }

    /// Append a connection to `port`. Returns its connection index.
    pub fn add_input_connection(
        &self,
        port: usize,
        producer: &Rc<Executive>,
        producer_port: usize,
    ) -> PipelineResult<usize> {
        self.check_connection(port, producer, producer_port)?;
        let index = {
            let mut inputs = self.inputs.borrow_mut();
            inputs[port].push(Connection {
                producer: producer.clone(),
                port: producer_port,
            });
            inputs[port].len() - 1
        };
        self.connections_modified();
        tracing::info!(
            "Added connection {}:{} -> {}:{}[{}]",
            producer.name(),
            producer_port,
            self.name,
            port,
            index
        );
        Ok(index)
    }

    pub fn remove_input_connection(&self, port: usize, index: usize) -> PipelineResult<Connection> {
        self.check_input_port(port)?;
        let removed = {
            let mut inputs = self.inputs.borrow_mut();
            let connections = inputs[port].len();
            if index >= connections {
                return Err(PipelineError::ConnectionRange {
                    node: self.name.clone(),
                    port,
                    index,
                    connections,
                });
            }
            inputs[port].remove(index)
        };
        self.connections_modified();
        tracing::info!("Removed connection {:?} from {}:{}", removed, self.name, port);
        Ok(removed)
    }

    pub fn remove_all_input_connections(&self, port: usize) -> PipelineResult<()> {
        self.check_input_port(port)?;
        let had = std::mem::take(&mut self.inputs.borrow_mut()[port]);
        if !had.is_empty() {
            self.connections_modified();
            tracing::info!("Removed {} connections from {}:{}", had.len(), self.name, port);
        }
        Ok(())
    }

    pub fn number_of_input_connections(&self, port: usize) -> usize {
        self.inputs.borrow().get(port).map_or(0, Vec::len)
    }

    /// Snapshot of every input connection, per port.
    pub fn connections(&self) -> Vec<Vec<Connection>> {
        self.inputs.borrow().clone()
    }

    pub fn input_connection(&self, port: usize, index: usize) -> PipelineResult<Connection> {
        self.check_input_port(port)?;
        let inputs = self.inputs.borrow();
        let connections = inputs[port].len();
        inputs[port]
            .get(index)
            .cloned()
            .ok_or(PipelineError::ConnectionRange {
                node: self.name.clone(),
                port,
                index,
                connections,
            })
    }

    /// Executive producing connection `index` of input `port`.
    pub fn input_executive(&self, port: usize, index: usize) -> PipelineResult<Rc<Executive>> {
        Ok(self.input_connection(port, index)?.producer)
    }

    /// Output information behind connection `index` of input `port`.
    pub fn input_information(&self, port: usize, index: usize) -> PipelineResult<InformationRef> {
        let connection = self.input_connection(port, index)?;
        self.resolve(&connection)
    }

    /// Whether `other` is this executive or feeds it, directly or not.
    pub fn depends_on(&self, other: &Executive) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.inputs
            .borrow()
            .iter()
            .flatten()
            .any(|c| c.producer.depends_on(other))
    }

    fn check_connection(
        &self,
        port: usize,
        producer: &Rc<Executive>,
        producer_port: usize,
    ) -> PipelineResult<()> {
        self.check_input_port(port)?;
        producer.check_output_port(Some(producer_port), "connect")?;
        if producer.depends_on(self) {
            tracing::error!(
                "Refusing connection {} -> {}: would create a cycle",
                producer.name(),
                self.name
            );
            return Err(PipelineError::Cycle {
                producer: producer.name().to_string(),
                consumer: self.name.clone(),
            });
        }
        Ok(())
    }

    fn connections_modified(&self) {
        self.mtime.set(TimeStamp::now());
    }

    fn resolve(&self, connection: &Connection) -> PipelineResult<InformationRef> {
        connection
            .producer
            .output_information(connection.port)
            .ok_or_else(|| {
                tracing::error!(
                    "Producer '{}' of '{}' has no output port {}",
                    connection.producer.name(),
                    self.name,
                    connection.port
                );
                PipelineError::Configuration {
                    node: self.name.clone(),
                    message: format!(
                        "producer '{}' has no output port {}",
                        connection.producer.name(),
                        connection.port
                    ),
                }
            })
    }

    fn input_information_vector(
        &self,
        connections: &[Vec<Connection>],
    ) -> PipelineResult<Vec<Vec<InformationRef>>> {
        connections
            .iter()
            .map(|port| port.iter().map(|c| self.resolve(c)).collect())
            .collect()
    }

    // ── Modification times ──

    pub fn mtime(&self) -> TimeStamp {
        self.mtime.get()
    }

    /// Mark the node itself stale, as if a parameter had changed.
    pub fn modified(&self) {
        self.mtime.set(TimeStamp::now());
    }

    /// Pipeline time as of the last phase that computed it.
    pub fn pipeline_mtime(&self) -> TimeStamp {
        self.pipeline_mtime.get()
    }

    pub fn data_object_time(&self) -> TimeStamp {
        self.data_object_time.get()
    }

    pub fn information_time(&self) -> TimeStamp {
        self.information_time.get()
    }

    pub fn data_time(&self) -> TimeStamp {
        self.data_time.get()
    }

    /// Recompute the pipeline time for this node and everything upstream.
    pub fn update_pipeline_mtime(&self) -> PipelineResult<TimeStamp> {
        let connections = self.connections();
        for connection in connections.iter().flatten() {
            connection.producer.update_pipeline_mtime()?;
        }
        self.refresh_pipeline_mtime(&connections, "pipeline time")
    }

    /// Combine this node's stamps with the producers' current pipeline times.
    ///
    /// Fails when the algorithm is mutably borrowed, since its parameter
    /// stamp cannot be read.
    fn refresh_pipeline_mtime(
        &self,
        connections: &[Vec<Connection>],
        phase: &'static str,
    ) -> PipelineResult<TimeStamp> {
        let algorithm_mtime = self
            .algorithm
            .try_borrow()
            .map_err(|_| self.algorithm_borrowed(phase))?
            .mtime();
        let combined = connections
            .iter()
            .flatten()
            .map(|c| c.producer.pipeline_mtime.get())
            .fold(algorithm_mtime.max(self.mtime.get()), TimeStamp::max);
        self.pipeline_mtime.set(combined);
        Ok(combined)
    }

    fn algorithm_borrowed(&self, phase: &'static str) -> PipelineError {
        tracing::error!(
            "Algorithm of '{}' is borrowed by the caller during {}",
            self.name,
            phase
        );
        PipelineError::AlgorithmBorrowed {
            node: self.name.clone(),
            phase,
        }
    }

    // ── Guards ──

    fn check_algorithm(&self, attempted: Phase) -> PipelineResult<()> {
        let Some(active) = self.in_algorithm.get() else {
            return Ok(());
        };
        tracing::error!(
            "Reentrant {} request on '{}' while its {} handler is running",
            attempted,
            self.name,
            active
        );
        if self.config.fatal_reentrancy {
            panic!(
                "reentrant {attempted} request on '{}' while its {active} handler is running",
                self.name
            );
        }
        Err(PipelineError::Reentrancy {
            node: self.name.clone(),
            active,
            attempted,
        })
    }

    fn check_output_port(&self, port: Option<usize>, operation: &'static str) -> PipelineResult<()> {
        match port {
            Some(port) if port >= self.outputs.len() => {
                tracing::error!(
                    "{} given output port {} on '{}' with {} output ports",
                    operation,
                    port,
                    self.name,
                    self.outputs.len()
                );
                Err(PipelineError::OutputPortRange {
                    node: self.name.clone(),
                    operation,
                    port,
                    ports: self.outputs.len(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_input_port(&self, port: usize) -> PipelineResult<()> {
        let ports = self.input_port_information.len();
        if port >= ports {
            tracing::error!(
                "Input port {} out of range on '{}' with {} input ports",
                port,
                self.name,
                ports
            );
            return Err(PipelineError::InputPortRange {
                node: self.name.clone(),
                port,
                ports,
            });
        }
        Ok(())
    }

    fn validate_inputs(
        &self,
        connections: &[Vec<Connection>],
        inputs: &[Vec<InformationRef>],
    ) -> PipelineResult<()> {
        let counts: Vec<usize> = connections.iter().map(Vec::len).collect();
        validation::check_input_counts(&self.name, &self.input_port_information, &counts)?;
        validation::check_input_types(&self.name, &self.input_port_information, inputs)
    }

    fn call_algorithm(
        &self,
        phase: Phase,
        request: &mut Information,
        inputs: &[Vec<InformationRef>],
    ) -> PipelineResult<()> {
        tracing::debug!("Dispatching {} request to '{}'", phase, self.name);
        let ctx = RequestContext::new(self);
        let mut algorithm = self
            .algorithm
            .try_borrow_mut()
            .map_err(|_| self.algorithm_borrowed(phase.as_str()))?;
        self.in_algorithm.set(Some(phase));
        let _guard = AlgorithmGuard(&self.in_algorithm);
        algorithm.process_request(&ctx, request, inputs, &self.outputs)
    }

    // ── Data object phase ──

    /// Make sure every output holds a data object of the declared kind.
    pub fn update_data_object(&self) -> PipelineResult<()> {
        self.check_algorithm(Phase::DataObject)?;
        let connections = self.connections();
        for connection in connections.iter().flatten() {
            connection.producer.update_data_object()?;
        }
        let pipeline_mtime =
            self.refresh_pipeline_mtime(&connections, Phase::DataObject.as_str())?;
        if pipeline_mtime <= self.data_object_time.get() {
            tracing::trace!("'{}' data objects are current", self.name);
            return Ok(());
        }

        let inputs = self.input_information_vector(&connections)?;
        self.validate_inputs(&connections, &inputs)?;
        let mut request = Information::new();
        request.set_request(&keys::REQUEST_DATA_OBJECT);
        self.call_algorithm(Phase::DataObject, &mut request, &inputs)?;
        self.check_data_objects()?;
        self.data_object_time.set(TimeStamp::now());
        Ok(())
    }

    /// Install declared output kinds the algorithm did not provide.
    fn check_data_objects(&self) -> PipelineResult<()> {
        for (port, (out, port_info)) in self
            .outputs
            .iter()
            .zip(&self.output_port_information)
            .enumerate()
        {
            let current = out.borrow().data_object();
            let declared = port_info.get_copied(&keys::DATA_TYPE_NAME);
            let data = match (current, declared) {
                (Some(data), Some(kind)) if data.borrow().is_a(kind) => data,
                (_, Some(kind)) => {
                    let Some(data) = new_data_object(kind) else {
                        return Err(self.missing_output(port, Some(kind)));
                    };
                    tracing::debug!("Created {} for '{}' output {}", kind, self.name, port);
                    out.borrow_mut().set(&keys::DATA_OBJECT, data.clone());
                    data
                }
                (Some(data), None) => data,
                (None, None) => return Err(self.missing_output(port, None)),
            };
            let mut data = data.borrow_mut();
            let linked = data
                .core()
                .producer()
                .is_some_and(|p| p.port() == port && p.executive().is_some_and(|e| std::ptr::eq(&*e, self)));
            if !linked {
                data.core_mut()
                    .set_producer(Some(ProducerLink::new(self.this.clone(), port)));
            }
        }
        Ok(())
    }

    fn missing_output(&self, port: usize, declared: Option<DataKind>) -> PipelineError {
        let message = match declared {
            Some(kind) => format!(
                "did not create output for port {port} and its DATA_TYPE_NAME {kind} is abstract"
            ),
            None => format!(
                "did not create output for port {port} and does not declare a DATA_TYPE_NAME"
            ),
        };
        tracing::error!("'{}' {}", self.name, message);
        PipelineError::NodeImplementation {
            node: self.name.clone(),
            message,
        }
    }

    // ── Information phase ──

    /// Refresh output metadata. Runs the data object phase first.
    pub fn update_information(&self) -> PipelineResult<()> {
        self.check_algorithm(Phase::Information)?;
        self.update_data_object()?;
        let connections = self.connections();
        for connection in connections.iter().flatten() {
            connection.producer.update_information()?;
        }
        let pipeline_mtime =
            self.refresh_pipeline_mtime(&connections, Phase::Information.as_str())?;
        if pipeline_mtime <= self.information_time.get() {
            tracing::trace!("'{}' information is current", self.name);
            return Ok(());
        }

        let inputs = self.input_information_vector(&connections)?;
        self.validate_inputs(&connections, &inputs)?;
        if let Some(first) = inputs.first().and_then(|port| port.first()) {
            let first = first.borrow();
            for out in &self.outputs {
                streaming::copy_downstream_information(&first, &mut out.borrow_mut());
            }
        }
        let mut request = Information::new();
        request.set_request(&keys::REQUEST_INFORMATION);
        self.call_algorithm(Phase::Information, &mut request, &inputs)?;
        self.reset_requests_to_whole()?;
        self.information_time.set(TimeStamp::now());
        Ok(())
    }

    fn reset_requests_to_whole(&self) -> PipelineResult<()> {
        for (port, out) in self.outputs.iter().enumerate() {
            let mut info = out.borrow_mut();
            let Some(data) = info.data_object() else {
                tracing::error!("'{}' removed the data object from output {}", self.name, port);
                return Err(PipelineError::NodeImplementation {
                    node: self.name.clone(),
                    message: format!("output {port} has no data object after the information pass"),
                });
            };
            let structured = data.borrow().extent_type() == ExtentType::ThreeD;
            if structured && !info.has(&keys::WHOLE_EXTENT) {
                info.set(&keys::WHOLE_EXTENT, crate::data::Extent::EMPTY);
            }
            streaming::set_request_to_whole(&mut info);
        }
        Ok(())
    }

    // ── Update extent phase ──

    /// Push the request on output `port` (all outputs for `None`) upstream.
    pub fn propagate_update_extent(&self, port: Option<usize>) -> PipelineResult<()> {
        self.check_algorithm(Phase::UpdateExtent)?;
        self.check_output_port(port, "propagate_update_extent")?;
        self.short_circuited.set(true);
        self.verify_output_information(port)?;
        if let Some(port) = port {
            streaming::combine_update_extent(&mut self.outputs[port].borrow_mut());
        }

        let connections = self.connections();
        let inputs = self.input_information_vector(&connections)?;
        let mut need = self.need_to_execute_data(port);
        if !need {
            need = self.first_input_request_differs(port, &inputs);
        }
        if !need {
            tracing::trace!("'{}' request already satisfied", self.name);
            self.clear_combined_update_extents(port);
            return Ok(());
        }

        self.validate_inputs(&connections, &inputs)?;
        self.short_circuited.set(false);
        self.copy_update_request(port, &inputs);
        let mut request = Information::new();
        request.set_request(&keys::REQUEST_UPDATE_EXTENT);
        request.set(&keys::FROM_OUTPUT_PORT, port.map_or(-1, |p| p as i64));
        self.call_algorithm(Phase::UpdateExtent, &mut request, &inputs)?;

        for connection in connections.iter().flatten() {
            connection
                .producer
                .propagate_update_extent(Some(connection.port))?;
        }
        Ok(())
    }

    fn clear_combined_update_extents(&self, port: Option<usize>) {
        for (p, out) in self.outputs.iter().enumerate() {
            if port.map_or(true, |port| port == p) {
                streaming::clear_combined_update_extent(&mut out.borrow_mut());
            }
        }
    }

    /// Drop combined requests here and upstream after a failed update.
    fn forget_combined_update_extents(&self) {
        self.clear_combined_update_extents(None);
        for connection in self.connections().iter().flatten() {
            connection.producer.forget_combined_update_extents();
        }
    }

    fn verify_output_information(&self, port: Option<usize>) -> PipelineResult<()> {
        let ports: Vec<usize> = match port {
            Some(port) => vec![port],
            None => (0..self.outputs.len()).collect(),
        };
        for port in ports {
            let mut info = self.outputs[port].borrow_mut();
            let Some(data) = info.data_object() else {
                return Err(self.invalid_request(port, "no data object on the output"));
            };
            let extent_type = data.borrow().extent_type();
            match extent_type {
                ExtentType::Pieces => {
                    if !info.has(&keys::UPDATE_PIECE_NUMBER) {
                        return Err(self.invalid_request(port, "no update piece number"));
                    }
                    if !info.has(&keys::UPDATE_NUMBER_OF_PIECES) {
                        return Err(self.invalid_request(port, "no update number of pieces"));
                    }
                    if !info.has(&keys::UPDATE_NUMBER_OF_GHOST_LEVELS) {
                        info.set(&keys::UPDATE_NUMBER_OF_GHOST_LEVELS, 0);
                    }
                }
                ExtentType::ThreeD => {
                    let Some(whole) = info.get_copied(&keys::WHOLE_EXTENT) else {
                        return Err(self.invalid_request(port, "no whole extent"));
                    };
                    let Some(update) = info.get_copied(&keys::UPDATE_EXTENT) else {
                        return Err(self.invalid_request(port, "no update extent"));
                    };
                    if !update.is_empty() && !whole.contains(&update) {
                        return Err(self.invalid_request(
                            port,
                            &format!("update extent {update:?} is outside the whole extent {whole:?}"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn invalid_request(&self, port: usize, problem: &str) -> PipelineError {
        tracing::error!("Invalid request on '{}' output {}: {}", self.name, port, problem);
        PipelineError::InvalidRequest(format!("'{}' output {}: {}", self.name, port, problem))
    }

    /// A filter whose own output is current must still forward a changed
    /// piece request.
    fn first_input_request_differs(
        &self,
        port: Option<usize>,
        inputs: &[Vec<InformationRef>],
    ) -> bool {
        let Some(input) = inputs.first().and_then(|p| p.first()) else {
            return false;
        };
        let Some(out) = self.outputs.get(port.unwrap_or(0)) else {
            return false;
        };
        let input = input.borrow();
        let out = out.borrow();
        let pieces = out.get_copied(&keys::UPDATE_NUMBER_OF_PIECES);
        if input.get_copied(&keys::UPDATE_NUMBER_OF_PIECES) != pieces {
            return true;
        }
        pieces != Some(1)
            && input.get_copied(&keys::UPDATE_PIECE_NUMBER)
                != out.get_copied(&keys::UPDATE_PIECE_NUMBER)
    }

    fn copy_update_request(&self, port: Option<usize>, inputs: &[Vec<InformationRef>]) {
        for input in inputs.iter().flatten() {
            streaming::set_request_to_whole(&mut input.borrow_mut());
        }
        let Some(out) = self.outputs.get(port.unwrap_or(0)) else {
            return;
        };
        let out = out.borrow();
        for input in inputs.iter().flatten() {
            let mut input = input.borrow_mut();
            let Some(data) = input.data_object() else {
                tracing::error!("Input of '{}' has no data object to request from", self.name);
                continue;
            };
            let extent_type = data.borrow().extent_type();
            streaming::copy_update_request(&out, &mut input, extent_type);
        }
    }

    // ── Data phase ──

    /// Regenerate output `port` (all outputs for `None`) if its request is
    /// not satisfied, after bringing every producer up to date.
    pub fn update_data(&self, port: Option<usize>) -> PipelineResult<()> {
        self.check_algorithm(Phase::Data)?;
        self.check_output_port(port, "update_data")?;
        let connections = self.connections();
        for connection in connections.iter().flatten() {
            connection.producer.update_data(Some(connection.port))?;
        }
        if !self.need_to_execute_data(port) {
            tracing::trace!("'{}' data is current", self.name);
            return Ok(());
        }

        let inputs = self.input_information_vector(&connections)?;
        self.validate_inputs(&connections, &inputs)?;
        validation::check_input_fields(&self.name, &self.input_port_information, &inputs)?;
        self.execute_data(port, &inputs)?;

        let now = TimeStamp::now();
        self.data_time.set(now);
        self.information_time.set(now);
        self.data_object_time.set(now);
        Ok(())
    }

    fn execute_data(&self, port: Option<usize>, inputs: &[Vec<InformationRef>]) -> PipelineResult<()> {
        let mut request = Information::new();
        request.set_request(&keys::REQUEST_DATA);
        request.set(&keys::FROM_OUTPUT_PORT, port.map_or(-1, |p| p as i64));
        if self.continue_executing.get() {
            request.set(&keys::CONTINUE_EXECUTING, true);
        } else {
            for out in &self.outputs {
                let data = out.borrow().data_object();
                if let Some(data) = data {
                    data.borrow_mut().initialize();
                }
            }
        }

        tracing::info!("Executing '{}'", self.name);
        self.call_algorithm(Phase::Data, &mut request, inputs)?;

        if request.get_or(&keys::CONTINUE_EXECUTING, false) {
            self.continue_executing.set(true);
        } else {
            self.continue_executing.set(false);
            self.mark_outputs_generated(port, inputs);
            self.clear_combined_update_extents(None);
            self.release_inputs(inputs);
        }
        Ok(())
    }

    fn mark_outputs_generated(&self, port: Option<usize>, inputs: &[Vec<InformationRef>]) {
        let Some(from) = self.outputs.get(port.unwrap_or(0)) else {
            return;
        };
        let (request, update_step) = {
            let from = from.borrow();
            (
                PieceRequest::from_information(&from),
                from.get_copied(&keys::UPDATE_TIME_STEP),
            )
        };
        let input_step = inputs
            .first()
            .and_then(|p| p.first())
            .and_then(|info| info.borrow().data_object())
            .and_then(|data| data_time_step(&data));

        for out in &self.outputs {
            let mut info = out.borrow_mut();
            if info.remove(&keys::DATA_NOT_GENERATED) {
                continue;
            }
            let Some(data) = info.data_object() else {
                continue;
            };
            let mut data = data.borrow_mut();
            let core = data.core_mut();
            core.set_data_released(false);
            core.mark_updated();

            let data_info = core.information_mut();
            if data_info.get_or(&keys::DATA_PIECE_NUMBER, -1) == -1 {
                data_info.set(&keys::DATA_PIECE_NUMBER, request.piece);
                data_info.set(&keys::DATA_NUMBER_OF_PIECES, request.pieces);
                let ghosts = data_info
                    .get_or(&keys::DATA_NUMBER_OF_GHOST_LEVELS, 0)
                    .max(request.ghost_levels);
                data_info.set(&keys::DATA_NUMBER_OF_GHOST_LEVELS, ghosts);
            }
            if !data_info.has(&keys::DATA_TIME_STEP) {
                let step = if info.has(&keys::TIME_RANGE) {
                    input_step.or(update_step)
                } else {
                    update_step
                };
                if let Some(step) = step {
                    data_info.set(&keys::DATA_TIME_STEP, step);
                }
            }
            match update_step {
                Some(step) => info.set(&keys::PREVIOUS_UPDATE_TIME_STEP, step),
                None => {
                    info.remove(&keys::PREVIOUS_UPDATE_TIME_STEP);
                }
            }
        }
    }

    fn release_inputs(&self, inputs: &[Vec<InformationRef>]) {
        for input in inputs.iter().flatten() {
            let input = input.borrow();
            if !input.get_or(&keys::RELEASE_DATA, false) {
                continue;
            }
            if let Some(data) = input.data_object() {
                tracing::warn!("'{}' releasing input data {:?}", self.name, data.borrow().kind());
                data.borrow_mut().release_data();
            }
        }
    }

    /// Whether output `port` (any output for `None`) must be regenerated to
    /// satisfy its current request.
    pub fn need_to_execute_data(&self, port: Option<usize>) -> bool {
        if self.continue_executing.get() {
            return true;
        }
        let Some(port) = port else {
            if self.outputs.is_empty() {
                return self.pipeline_mtime.get() > self.data_time.get();
            }
            return (0..self.outputs.len()).any(|p| self.need_to_execute_data(Some(p)));
        };
        let Some(out) = self.outputs.get(port) else {
            return false;
        };
        let out = out.borrow();
        let request = PieceRequest::from_information(&out);

        if self.input_port_information.is_empty() && request.pieces > 1 && request.piece > 0 {
            let can_handle = out.get_or(&keys::CAN_HANDLE_PIECE_REQUEST, false)
                || self.output_port_information[port].get_or(&keys::CAN_HANDLE_PIECE_REQUEST, false);
            if !can_handle {
                tracing::trace!(
                    "'{}' cannot produce piece {} of {}",
                    self.name,
                    request.piece,
                    request.pieces
                );
                return false;
            }
        }

        if self.pipeline_mtime.get() > self.data_time.get() {
            return true;
        }
        let Some(data) = out.data_object() else {
            return true;
        };
        let data = data.borrow();
        if data.update_time() < self.pipeline_mtime.get() || data.data_released() {
            return true;
        }
        let data_info = data.core().information();
        if streaming::piece_needs_update(&request, data_info) {
            return true;
        }
        if streaming::extent_needs_update(&out, &*data) == Some(true) {
            return true;
        }
        streaming::time_needs_update(&out, data_info).unwrap_or(false)
    }

    // ── Update entry points ──

    /// Bring every output up to date for its current request.
    pub fn update(&self) -> PipelineResult<()> {
        self.update_with_request(None, None)
    }

    pub fn update_port(&self, port: usize) -> PipelineResult<()> {
        self.update_with_request(Some(port), None)
    }

    /// Run all phases for `port`, after writing `request` (piece, extent,
    /// time step keys) onto the targeted outputs.
    pub fn update_with_request(
        &self,
        port: Option<usize>,
        request: Option<&Information>,
    ) -> PipelineResult<()> {
        self.check_output_port(port, "update")?;
        self.update_information()?;
        if let Some(request) = request {
            for (p, out) in self.outputs.iter().enumerate() {
                if port.map_or(true, |port| port == p) {
                    out.borrow_mut().append(request);
                }
            }
        }

        let result = self.run_update_passes(port);
        if result.is_err() {
            self.continue_executing.set(false);
            self.forget_combined_update_extents();
        }
        result
    }

    fn run_update_passes(&self, port: Option<usize>) -> PipelineResult<()> {
        let mut passes = 0u32;
        loop {
            self.propagate_update_extent(port)?;
            if !self.short_circuited.get() {
                self.update_data(port)?;
            }
            if !self.continue_executing.get() {
                return Ok(());
            }
            passes += 1;
            if passes >= self.config.max_continue_executions {
                tracing::warn!(
                    "'{}' asked to continue executing after {} passes; stopping",
                    self.name,
                    passes
                );
                self.continue_executing.set(false);
                return Ok(());
            }
        }
    }

    /// Ask output `port` for one piece of a partitioned result.
    pub fn update_piece(
        &self,
        port: usize,
        piece: i64,
        pieces: i64,
        ghost_levels: i64,
    ) -> PipelineResult<()> {
        let mut request = Information::new();
        PieceRequest::new(piece, pieces, ghost_levels).write(&mut request);
        self.update_with_request(Some(port), Some(&request))
    }

    /// Ask output `port` for one time step.
    pub fn update_time_step(&self, port: usize, time: f64) -> PipelineResult<()> {
        let mut request = Information::new();
        request.set(&keys::UPDATE_TIME_STEP, time);
        self.update_with_request(Some(port), Some(&request))
    }

    /// Ask output `port` for a structured sub-extent.
    pub fn update_extent(&self, port: usize, extent: crate::data::Extent) -> PipelineResult<()> {
        let mut request = Information::new();
        streaming::set_update_extent(&mut request, extent);
        self.update_with_request(Some(port), Some(&request))
    }

    /// Reset output `port`'s request to everything and update it.
    pub fn update_whole_extent(&self, port: usize) -> PipelineResult<()> {
        self.check_output_port(Some(port), "update_whole_extent")?;
        self.update_information()?;
        self.set_update_extent_to_whole_extent(port)?;
        self.update_port(port)
    }

    pub fn set_update_extent_to_whole_extent(&self, port: usize) -> PipelineResult<()> {
        self.check_output_port(Some(port), "set_update_extent_to_whole_extent")?;
        let mut info = self.outputs[port].borrow_mut();
        streaming::set_request_to_whole(&mut info);
        info.remove(&keys::UPDATE_TIME_STEP);
        Ok(())
    }
}

fn data_time_step(data: &crate::data::DataObjectRef) -> Option<f64> {
    data.borrow()
        .core()
        .information()
        .get_copied(&keys::DATA_TIME_STEP)
}

impl fmt::Debug for Executive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executive")
            .field("name", &self.name)
            .field("inputs", &*self.inputs.borrow())
            .field("outputs", &self.outputs.len())
            .field("pipeline_mtime", &self.pipeline_mtime.get())
            .field("data_time", &self.data_time.get())
            .finish()
    }
}
