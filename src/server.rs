//! Poll-driven connection state machine.
//!
//! A [`Server`] owns a fixed pool of connection slots.  The environment
//! reports transport events into it (`on_accept`, `on_received`, `on_sent`,
//! `on_closed`) and calls [`drive_io`](Server::drive_io) on every poll tick;
//! nothing here blocks and nothing runs in the background.  Outbound flow
//! control is plain byte bookkeeping: each slot tracks bytes queued, bytes
//! handed to the transport, and bytes the transport has acknowledged, and
//! the buffer recycles once everything offered has been acknowledged.
//!
//! Each slot's buffer serves both directions: the request accumulates in
//! the front, and the response head plus body are staged in whatever space
//! remains behind it.

use embedded_io::Error as _;
use embedded_io::ErrorKind;

use crate::header::ConnType;
use crate::request::{Method, Request, RequestBuffer, RequestState};
use crate::response::Response;

/// Non-blocking outbound side of the environment's transport, addressed by
/// slot index.
pub trait Transport {
    /// Transport error type.
    type Error: embedded_io::Error;

    /// Offer `data` for transmission on connection `index`.  Returns how
    /// many bytes the transport accepted, possibly zero.  Must not block.
    fn try_send(&mut self, index: usize, data: &[u8]) -> Result<usize, Self::Error>;

    /// Begin teardown of connection `index`.
    fn close(&mut self, index: usize) -> Result<(), Self::Error>;
}

/// Application callbacks driven by the connection machine.
pub trait RequestHandler {
    /// Opaque per-connection application state, reset on every accept.
    type Context: Default;

    /// Called once per completed request.  The descriptor arrives prefilled
    /// with status 200 and the stock defaults; mutate it to describe the
    /// response, and return the connection context to accept.  Returning
    /// `None` declines the request and closes the connection without a
    /// response.
    fn handle_request(&mut self, req: Request<'_>, resp: &mut Response) -> Option<Self::Context>;

    /// The response head has been fully acknowledged; the connection is
    /// [`Active`](ConnState::Active) and body bytes may now be written.
    fn on_active(&mut self, _index: usize, _ctx: &mut Self::Context) {}

    /// A connection-fatal error occurred; the slot is on its way to
    /// [`Closed`](ConnState::Closed).
    fn on_error(&mut self, _index: usize, _err: ServerError) {}
}

/// Connection slot lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnState {
    /// Unused slot, available to `on_accept`.
    Free,
    /// Accumulating request bytes.
    ReadingRequest,
    /// Draining the formatted response head.
    WritingResponse,
    /// Head acknowledged; the application streams the body.
    Active,
    /// Teardown pending on the next poll tick.
    Closing,
    /// Torn down; recycle with [`Server::free`].
    Closed,
}

/// Connection-fatal error kinds reported through
/// [`RequestHandler::on_error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServerError {
    /// The request accumulator hit an unrecognized transition.
    RequestSyntax,
    /// The request exceeded the buffer space reserved for it.
    RequestTooBig,
    /// The formatted response head did not fit the remaining slot buffer.
    ResponseTooBig,
    /// The transport reported a failure.
    Transport(ErrorKind),
    /// The request was declined, by method policy or by the handler.
    Rejected,
}

struct Slot<const N: usize, C> {
    state: ConnState,
    reqb: RequestBuffer<N>,
    resp: Response,
    ctx: C,
    /// Bytes staged in the slot buffer behind the request.
    queued: usize,
    /// Bytes handed to the transport.
    sent: usize,
    /// Bytes the transport has acknowledged.
    acked: usize,
    /// Body bytes the application has written so far.
    delivered: usize,
}

impl<const N: usize, C: Default> Slot<N, C> {
    fn new(limit: usize) -> Self {
        Slot {
            state: ConnState::Free,
            reqb: RequestBuffer::new(limit),
            resp: Response::default(),
            ctx: C::default(),
            queued: 0,
            sent: 0,
            acked: 0,
            delivered: 0,
        }
    }
}

/// Fixed-pool HTTP connection machine.
///
/// `MAX_CON` slots, each owning a `BUF_SIZE` byte buffer of which at most
/// `MAX_REQUEST` bytes are reserved for the inbound request.  Slot indices
/// returned by [`on_accept`](Server::on_accept) address every other
/// operation; indices are only valid below `MAX_CON`.
pub struct Server<T, H, const MAX_CON: usize, const BUF_SIZE: usize, const MAX_REQUEST: usize>
where
    H: RequestHandler,
{
    transport: T,
    handler: H,
    slots: [Slot<BUF_SIZE, H::Context>; MAX_CON],
}

impl<T, H, const MAX_CON: usize, const BUF_SIZE: usize, const MAX_REQUEST: usize>
    Server<T, H, MAX_CON, BUF_SIZE, MAX_REQUEST>
where
    T: Transport,
    H: RequestHandler,
{
    /// Server with all slots free.
    pub fn new(transport: T, handler: H) -> Self {
        Server {
            transport,
            handler,
            slots: core::array::from_fn(|_| Slot::new(MAX_REQUEST)),
        }
    }

    /// Claim the first free slot for a new connection and start reading.
    /// `None` when the pool is exhausted; the caller should refuse the
    /// connection, the server itself is unaffected.
    pub fn on_accept(&mut self) -> Option<usize> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.state == ConnState::Free)?;
        let slot = &mut self.slots[index];
        slot.reqb.reset();
        slot.resp = Response::default();
        slot.ctx = H::Context::default();
        slot.queued = 0;
        slot.sent = 0;
        slot.acked = 0;
        slot.delivered = 0;
        slot.state = ConnState::ReadingRequest;
        Some(index)
    }

    /// Feed received bytes to the slot's request accumulator.  Ignored
    /// outside [`ReadingRequest`](ConnState::ReadingRequest).
    pub fn on_received(&mut self, index: usize, data: &[u8]) {
        if self.slots[index].state != ConnState::ReadingRequest {
            return;
        }
        match self.slots[index].reqb.push(data) {
            RequestState::Unfinished => return,
            RequestState::Finished => self.request_finished(index),
            RequestState::TooBig => {
                self.handler.on_error(index, ServerError::RequestTooBig);
                self.slots[index].state = ConnState::Closing;
            }
            RequestState::SyntaxError => {
                self.handler.on_error(index, ServerError::RequestSyntax);
                self.slots[index].state = ConnState::Closing;
            }
        }
        self.drive_io();
    }

    fn request_finished(&mut self, index: usize) {
        if self.slots[index].reqb.request().method() != Method::GET {
            self.handler.on_error(index, ServerError::Rejected);
            self.slots[index].state = ConnState::Closing;
            return;
        }

        let mut resp = Response::new(200);
        let Some(ctx) = self
            .handler
            .handle_request(self.slots[index].reqb.request(), &mut resp)
        else {
            self.handler.on_error(index, ServerError::Rejected);
            self.slots[index].state = ConnState::Closing;
            return;
        };

        let slot = &mut self.slots[index];
        let head = resp.formatted_len();
        if head > slot.reqb.tail().len() {
            self.handler.on_error(index, ServerError::ResponseTooBig);
            self.slots[index].state = ConnState::Closing;
            return;
        }
        resp.emit(slot.reqb.tail_mut());
        slot.resp = resp;
        slot.ctx = ctx;
        slot.queued = head;
        slot.sent = 0;
        slot.acked = 0;
        slot.delivered = 0;
        slot.state = ConnState::WritingResponse;
    }

    /// The transport acknowledged `count` more outbound bytes on `index`.
    pub fn on_sent(&mut self, index: usize, count: usize) {
        let slot = &mut self.slots[index];
        if slot.state == ConnState::Free || slot.state == ConnState::Closed {
            return;
        }
        slot.acked += count;
    }

    /// The environment reports the peer closed connection `index`.
    pub fn on_closed(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if slot.state != ConnState::Free && slot.state != ConnState::Closed {
            slot.state = ConnState::Closing;
        }
    }

    /// Poll tick.  Offers pending bytes to the transport, recycles the
    /// buffer once everything offered was acknowledged, advances the
    /// [`WritingResponse`](ConnState::WritingResponse) →
    /// [`Active`](ConnState::Active) → [`Closing`](ConnState::Closing)
    /// transitions, and finalizes teardown.  Slots are visited in index
    /// order.
    pub fn drive_io(&mut self) {
        for i in 0..MAX_CON {
            if matches!(self.slots[i].state, ConnState::Free | ConnState::Closed) {
                continue;
            }

            // unsent staged bytes: offer what the transport will take
            if self.slots[i].state != ConnState::Closing && self.slots[i].queued > self.slots[i].sent
            {
                let slot = &self.slots[i];
                let pending = &slot.reqb.tail()[slot.sent..slot.queued];
                match self.transport.try_send(i, pending) {
                    Ok(n) => self.slots[i].sent += n,
                    Err(err) => {
                        self.handler.on_error(i, ServerError::Transport(err.kind()));
                        self.slots[i].state = ConnState::Closing;
                    }
                }
            }

            // everything offered was acknowledged: recycle the buffer
            let slot = &mut self.slots[i];
            if slot.state != ConnState::Closing && slot.acked >= slot.sent && slot.sent > 0 {
                slot.queued = 0;
                slot.sent = 0;
                slot.acked = 0;
                if slot.state == ConnState::WritingResponse {
                    slot.state = ConnState::Active;
                    self.handler.on_active(i, &mut slot.ctx);
                } else if slot.state == ConnState::Active
                    && slot.resp.conn_type != ConnType::KeepAlive
                    && slot.delivered >= slot.resp.content_length
                {
                    slot.state = ConnState::Closing;
                }
            }

            if self.slots[i].state == ConnState::Closing {
                if let Err(err) = self.transport.close(i) {
                    self.handler.on_error(i, ServerError::Transport(err.kind()));
                }
                self.slots[i].state = ConnState::Closed;
            }
        }
    }

    /// Stage body bytes for connection `index`.  Valid only in
    /// [`Active`](ConnState::Active); accepts at most what fits within the
    /// declared content length and the remaining buffer space, and returns
    /// how many bytes it took.  The caller retries the rest after a later
    /// poll tick.
    pub fn write_body(&mut self, index: usize, data: &[u8]) -> usize {
        let slot = &mut self.slots[index];
        if slot.state != ConnState::Active {
            return 0;
        }
        let count = data
            .len()
            .min(slot.resp.content_length - slot.delivered)
            .min(slot.reqb.tail().len() - slot.queued);
        if count == 0 {
            return 0;
        }
        let queued = slot.queued;
        slot.reqb.tail_mut()[queued..queued + count].copy_from_slice(&data[..count]);
        slot.queued += count;
        slot.delivered += count;
        self.drive_io();
        count
    }

    /// Buffer space currently available to [`write_body`](Server::write_body).
    /// Zero outside [`Active`](ConnState::Active).
    pub fn write_avail(&self, index: usize) -> usize {
        let slot = &self.slots[index];
        if slot.state != ConnState::Active {
            return 0;
        }
        slot.reqb.tail().len() - slot.queued
    }

    /// Body bytes written so far for connection `index`.
    pub fn written(&self, index: usize) -> usize {
        self.slots[index].delivered
    }

    /// Cancel connection `index` from any state.  Teardown completes on the
    /// same call.
    pub fn close(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if slot.state == ConnState::Free || slot.state == ConnState::Closed {
            return;
        }
        slot.state = ConnState::Closing;
        self.drive_io();
    }

    /// Recycle a [`Closed`](ConnState::Closed) slot back to
    /// [`Free`](ConnState::Free).  Ignored in any other state, so the
    /// application always gets to observe the final state first.
    pub fn free(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if slot.state == ConnState::Closed {
            slot.state = ConnState::Free;
        }
    }

    /// Lifecycle state of slot `index`.
    pub fn state(&self, index: usize) -> ConnState {
        self.slots[index].state
    }

    /// Parsed request view for slot `index`.  Meaningful once the slot has
    /// left [`ReadingRequest`](ConnState::ReadingRequest) without error.
    pub fn request(&self, index: usize) -> Request<'_> {
        self.slots[index].reqb.request()
    }

    /// Response descriptor for slot `index`.
    pub fn response(&self, index: usize) -> &Response {
        &self.slots[index].resp
    }

    /// Application context for slot `index`.
    pub fn context(&self, index: usize) -> &H::Context {
        &self.slots[index].ctx
    }

    /// Mutable application context for slot `index`.
    pub fn context_mut(&mut self, index: usize) -> &mut H::Context {
        &mut self.slots[index].ctx
    }

    /// The transport instance.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The handler instance.
    pub fn handler(&self) -> &H {
        &self.handler
    }
}
