// device.rs
//
// The I/O device behind the libc surface. The provider trait lets tests
// substitute in-memory buffers for the process's real stdin/stdout.

use std::io::{self, Read, Write};

pub trait IoProvider {
    fn read_stdin(&mut self, buffer: &mut [u8]) -> io::Result<usize>;
    fn write_stdout(&mut self, data: &[u8]) -> io::Result<()>;
}

pub struct SystemIo;

impl IoProvider for SystemIo {
    fn read_stdin(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        io::stdin().lock().read(buffer)
    }

    fn write_stdout(&mut self, data: &[u8]) -> io::Result<()> {
        let mut handle = io::stdout().lock();
        handle.write_all(data)?;
        handle.flush()
    }
}

/// In-memory provider used by the end-to-end tests. Output goes to a
/// shared buffer the test keeps a handle on.
#[cfg(test)]
pub struct TestIo {
    stdin_data: Vec<u8>,
    stdin_pos: usize,
    stdout: std::rc::Rc<std::cell::RefCell<Vec<u8>>>,
}

#[cfg(test)]
impl TestIo {
    pub fn new() -> Self {
        Self {
            stdin_data: Vec::new(),
            stdin_pos: 0,
            stdout: std::rc::Rc::new(std::cell::RefCell::new(Vec::new())),
        }
    }

    pub fn with_stdin(mut self, data: Vec<u8>) -> Self {
        self.stdin_data = data;
        self.stdin_pos = 0;
        self
    }

    pub fn stdout_handle(&self) -> std::rc::Rc<std::cell::RefCell<Vec<u8>>> {
        self.stdout.clone()
    }
}

#[cfg(test)]
impl Default for TestIo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl IoProvider for TestIo {
    fn read_stdin(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let available = self.stdin_data.len() - self.stdin_pos;
        let to_read = buffer.len().min(available);
        buffer[..to_read]
            .copy_from_slice(&self.stdin_data[self.stdin_pos..self.stdin_pos + to_read]);
        self.stdin_pos += to_read;
        Ok(to_read)
    }

    fn write_stdout(&mut self, data: &[u8]) -> io::Result<()> {
        self.stdout.borrow_mut().extend_from_slice(data);
        Ok(())
    }
}

/// The device the interpreter talks to, with transfer counters for the
/// final report.
pub struct Device {
    io: Box<dyn IoProvider>,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl Device {
    pub fn system() -> Self {
        Device { io: Box::new(SystemIo), bytes_in: 0, bytes_out: 0 }
    }

    pub fn with_io(io: Box<dyn IoProvider>) -> Self {
        Device { io, bytes_in: 0, bytes_out: 0 }
    }

    pub fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let n = self.io.read_stdin(buffer)?;
        self.bytes_in += n as u64;
        Ok(n)
    }

    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.io.write_stdout(data)?;
        self.bytes_out += data.len() as u64;
        Ok(())
    }
}
