use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegionDoc { pub id: i32, pub nombre: String }

#[derive(ToSchema)]
pub struct RegionRefDoc { pub id: i32 }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ClienteDoc {
    pub id: i32,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    /// `YYYY-MM-DD`
    #[schema(format = Date)]
    pub create_at: String,
    pub foto: Option<String>,
    pub region: Option<RegionDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ClienteFormDoc {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    #[schema(format = Date)]
    pub create_at: String,
    pub region: Option<RegionRefDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ClientePageDoc {
    pub content: Vec<ClienteDoc>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
    pub number_of_elements: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

#[derive(ToSchema)]
pub struct ClienteResponseDoc { pub mensaje: String, pub cliente: ClienteDoc }

#[derive(ToSchema)]
pub struct MensajeDoc { pub mensaje: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub mensaje: String, pub error: String }

#[derive(ToSchema)]
pub struct ErrorsDoc { pub errors: Vec<String> }

#[derive(ToSchema)]
pub struct UploadFormDoc {
    #[schema(value_type = String, format = Binary)]
    pub archivo: Vec<u8>,
    pub id: i32,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductoDoc {
    pub id: i32,
    pub nombre: String,
    pub precio: f64,
    #[schema(format = Date)]
    pub create_at: String,
}

#[derive(ToSchema)]
pub struct ItemFacturaDoc {
    pub id: i32,
    pub cantidad: i32,
    pub producto: ProductoDoc,
    /// `cantidad * producto.precio`
    pub importe: f64,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct FacturaDoc {
    pub id: i32,
    pub descripcion: String,
    pub observacion: Option<String>,
    #[schema(format = Date)]
    pub create_at: String,
    pub cliente_id: i32,
    pub items: Vec<ItemFacturaDoc>,
    pub total: f64,
}

/// `{"id": ..}` reference to an existing row
#[derive(ToSchema)]
pub struct IdRefDoc { pub id: i32 }

#[derive(ToSchema)]
pub struct ItemFormDoc { pub cantidad: i32, pub producto: IdRefDoc }

#[derive(ToSchema)]
pub struct FacturaFormDoc {
    pub descripcion: String,
    pub observacion: Option<String>,
    pub cliente: IdRefDoc,
    pub items: Vec<ItemFormDoc>,
}

#[derive(ToSchema)]
pub struct FacturaResponseDoc { pub mensaje: String, pub factura: FacturaDoc }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::clientes::index,
        crate::routes::clientes::page,
        crate::routes::clientes::show,
        crate::routes::clientes::create,
        crate::routes::clientes::update,
        crate::routes::clientes::delete,
        crate::routes::clientes::upload,
        crate::routes::clientes::regiones,
        crate::routes::uploads::ver_foto,
        crate::routes::facturas::show,
        crate::routes::facturas::de_cliente,
        crate::routes::facturas::create,
        crate::routes::facturas::delete,
        crate::routes::facturas::filtrar_productos,
    ),
    components(
        schemas(
            HealthResponse,
            RegionDoc,
            RegionRefDoc,
            ClienteDoc,
            ClienteFormDoc,
            ClientePageDoc,
            ClienteResponseDoc,
            MensajeDoc,
            ErrorDoc,
            ErrorsDoc,
            UploadFormDoc,
            ProductoDoc,
            ItemFacturaDoc,
            FacturaDoc,
            IdRefDoc,
            ItemFormDoc,
            FacturaFormDoc,
            FacturaResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "clientes"),
        (name = "uploads"),
        (name = "facturas")
    )
)]
pub struct ApiDoc;
