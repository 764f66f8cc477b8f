#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use shading::Uniforms;
use surface::{Node, RenderSurface, SurfaceDesc, SurfaceError};

/// Everything a [`RecordingSurface`] was asked to do.
#[derive(Debug, Default)]
pub struct Log {
    /// Uniforms of each render together with the surface size at that moment.
    pub renders: Vec<(Uniforms, (u32, u32))>,
    pub resizes: Vec<(u32, u32)>,
    pub releases: usize,
    pub attached_to: Option<Node>,
    pub desc: Option<SurfaceDesc>,
    pub fail_resize: bool,
}

pub type SharedLog = Rc<RefCell<Log>>;

pub struct RecordingSurface {
    log: SharedLog,
    size: (u32, u32),
    element: Node,
    released: bool,
}

impl RecordingSurface {
    pub fn new(desc: &SurfaceDesc, log: SharedLog) -> Self {
        log.borrow_mut().desc = Some(desc.clone());
        Self {
            log,
            size: (desc.width, desc.height),
            element: Node::new("canvas#recording"),
            released: false,
        }
    }

    pub fn boxed(width: u32, height: u32) -> (Box<dyn RenderSurface>, SharedLog) {
        let log = SharedLog::default();
        let surface = Self::new(&SurfaceDesc::new(width, height), log.clone());
        (Box::new(surface), log)
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn element(&self) -> &Node {
        &self.element
    }

    fn attach(&mut self, parent: &Node) -> Result<(), SurfaceError> {
        parent.append_child(&self.element);
        self.log.borrow_mut().attached_to = Some(parent.clone());
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.log.borrow().fail_resize {
            return Err(SurfaceError::Gpu("resize refused".to_owned()));
        }
        self.size = (width, height);
        self.log.borrow_mut().resizes.push((width, height));
        Ok(())
    }

    fn render(&mut self, uniforms: &Uniforms) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        self.log.borrow_mut().renders.push((*uniforms, self.size));
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(parent) = self.log.borrow().attached_to.as_ref() {
            parent.remove_child(&self.element);
        }
        self.log.borrow_mut().releases += 1;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}
