use anyhow::bail;

/// Shortens the code needed to build a bind group and its layout from the same list of resources.
#[derive(Clone, Debug)]
pub enum BindingResourceTemplate<'a> {
    TextureView(wgpu::BindingResource<'a>),
    Sampler(wgpu::BindingResource<'a>),
}

impl<'a> BindingResourceTemplate<'a> {
    fn resource(&self) -> wgpu::BindingResource<'a> {
        match self {
            BindingResourceTemplate::TextureView(resource)
            | BindingResourceTemplate::Sampler(resource) => resource.clone(),
        }
    }
}

/// A binding plus the extra layout information some resources need.
pub struct BufferType<'a> {
    ty: BindingResourceTemplate<'a>,
    view_dimension: Option<wgpu::TextureViewDimension>,
    filterable: bool,
}

impl<'a> BufferType<'a> {
    pub fn new(ty: BindingResourceTemplate<'a>) -> Self {
        Self { ty, view_dimension: None, filterable: true }
    }

    /// Texture binding with an explicit view dimension. Only texture views take one.
    pub fn with_view_dimension(ty: BindingResourceTemplate<'a>, view_dimension: wgpu::TextureViewDimension) -> anyhow::Result<Self> {
        if !matches!(ty, BindingResourceTemplate::TextureView(_)) {
            bail!("Only texture views can have a view dimension");
        }
        Ok(Self { ty, view_dimension: Some(view_dimension), filterable: true })
    }

    /// Marks a texture or sampler binding as non-filtering.
    pub fn non_filtering(mut self) -> Self {
        self.filterable = false;
        self
    }

    fn layout_entry(&self, binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        let ty = match &self.ty {
            BindingResourceTemplate::TextureView(_) => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: self.filterable },
                view_dimension: self.view_dimension.unwrap_or(wgpu::TextureViewDimension::D2),
                multisampled: false,
            },
            BindingResourceTemplate::Sampler(_) => {
                let kind = if self.filterable {
                    wgpu::SamplerBindingType::Filtering
                } else {
                    wgpu::SamplerBindingType::NonFiltering
                };
                wgpu::BindingType::Sampler(kind)
            }
        };
        wgpu::BindGroupLayoutEntry { binding, visibility, ty, count: None }
    }
}

/// Describes a bind group once and generates both the layout and the group from it.
/// Bindings are numbered in the order they are listed.
pub struct BindGroupDescriptor<'a> {
    pub label: wgpu::Label<'a>,
    pub vis: wgpu::ShaderStages,
    pub bindings: Vec<BufferType<'a>>,
}

impl<'a> BindGroupDescriptor<'a> {
    pub fn new(label: wgpu::Label<'a>, vis: wgpu::ShaderStages, bindings: Vec<BufferType<'a>>) -> Self {
        Self { label, vis, bindings }
    }

    pub fn layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.bindings
            .iter()
            .zip(0u32..)
            .map(|(binding, index)| binding.layout_entry(index, self.vis))
            .collect()
    }

    pub fn generate_bind_group_layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let label = self.label.map(|label| format!("{}_bind_group_layout", label));
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: label.as_deref(),
            entries: &self.layout_entries(),
        })
    }

    /// Generates the bind group against a layout built from this descriptor.
    pub fn generate_bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        let entries = self
            .bindings
            .iter()
            .zip(0u32..)
            .map(|(binding, index)| wgpu::BindGroupEntry {
                binding: index,
                resource: binding.ty.resource(),
            })
            .collect::<Vec<_>>();

        let label = self.label.map(|label| format!("{}_bind_group", label));
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: label.as_deref(),
            layout,
            entries: &entries,
        })
    }
}
