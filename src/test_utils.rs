use crate::assembler::assemble;
use crate::device::{Device, TestIo};
use crate::error::Result;
use crate::exception::FailToInterpret;
use crate::interpreter::{Interpreter, Outcome};
use crate::linker::{link, LinkedImage};
use std::cell::RefCell;
use std::rc::Rc;

pub const TEST_TIMEOUT: u64 = 100_000;

/// Assemble and link a set of (file name, source) pairs.
pub fn build(sources: &[(&str, &str)]) -> Result<LinkedImage> {
    let mut objects = Vec::new();
    for (name, source) in sources {
        objects.push(assemble(name, source)?);
    }
    link(&objects)
}

pub fn build_one(source: &str) -> Result<LinkedImage> {
    build(&[("test.s", source)])
}

pub struct TestRun {
    pub result: std::result::Result<Outcome, FailToInterpret>,
    pub interp: Interpreter,
    pub stdout: Rc<RefCell<Vec<u8>>>,
}

impl TestRun {
    pub fn stdout_bytes(&self) -> Vec<u8> {
        self.stdout.borrow().clone()
    }

    pub fn reg(&self, index: usize) -> i32 {
        self.interp.regs.get(index)
    }
}

/// Run a single-file program to completion with a captured device.
pub fn run_source(source: &str) -> TestRun {
    run_with(source, b"", TEST_TIMEOUT)
}

pub fn run_with(source: &str, stdin: &[u8], timeout: u64) -> TestRun {
    let image = build_one(source).expect("program should build");
    let io = TestIo::new().with_stdin(stdin.to_vec());
    let stdout = io.stdout_handle();
    let mut interp = Interpreter::new(&image, Device::with_io(Box::new(io)));
    let result = interp.run(timeout);
    TestRun { result, interp, stdout }
}

pub fn assert_exit(run: &TestRun, code: i32) {
    match run.result {
        Ok(Outcome::Exit(actual)) => assert_eq!(actual, code, "wrong exit code"),
        ref other => panic!("expected exit({}), got {:?}", code, other),
    }
}
